use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::str::FromStr;

use face_catalog_core::catalog::domain::face_record::{RecordField, SearchField};
use face_catalog_core::pipeline::analyze_image_use_case::AnalyzeImageUseCase;
use face_catalog_core::pipeline::catalog_view::CatalogView;
use face_catalog_core::pipeline::session_error::SessionError;

use crate::display::{format_attributes, format_sort, format_table};

const HELP: &str = "\
Commands:
  list                      show the records matching the current search
  search <field> <term>     filter by field (all, filename, gender, age_range, emotion, race)
  clear                     clear the search
  sort <column>             sort by column; repeat to toggle direction
  reset                     reload from disk, dropping sort and search
  select <filename>         select a record and show its image path
  delete [filename]         delete the named or selected record
  analyze <image>           show attributes for an image without storing it
  save <image>              analyze an image and add it to the catalog
  help                      show this text
  quit                      leave the shell";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    List,
    Search { field: SearchField, term: String },
    Clear,
    Sort(RecordField),
    Reset,
    Select(String),
    Delete(Option<String>),
    Analyze(PathBuf),
    Save(PathBuf),
    Help,
    Quit,
}

impl FromStr for ShellCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (verb, rest) = match line.split_once(char::is_whitespace) {
            Some((verb, rest)) => (verb, rest.trim()),
            None => (line, ""),
        };
        let required = |what: &str| {
            if rest.is_empty() {
                Err(format!("usage: {verb} <{what}>"))
            } else {
                Ok(rest.to_string())
            }
        };

        match verb.to_lowercase().as_str() {
            "list" | "ls" => Ok(ShellCommand::List),
            "search" => {
                let (field, term) = match rest.split_once(char::is_whitespace) {
                    Some((field, term)) => (field, term.trim()),
                    None => (rest, ""),
                };
                if field.is_empty() {
                    return Err("usage: search <field> <term>".to_string());
                }
                let field = field.parse::<SearchField>().map_err(|e| e.to_string())?;
                Ok(ShellCommand::Search {
                    field,
                    term: term.to_string(),
                })
            }
            "clear" => Ok(ShellCommand::Clear),
            "sort" => {
                let column = required("column")?;
                column
                    .parse::<RecordField>()
                    .map(ShellCommand::Sort)
                    .map_err(|e| e.to_string())
            }
            "reset" => Ok(ShellCommand::Reset),
            "select" => required("filename").map(ShellCommand::Select),
            "delete" | "rm" => Ok(ShellCommand::Delete(
                (!rest.is_empty()).then(|| rest.to_string()),
            )),
            "analyze" => required("image").map(|p| ShellCommand::Analyze(PathBuf::from(p))),
            "save" => required("image").map(|p| ShellCommand::Save(PathBuf::from(p))),
            "help" | "?" => Ok(ShellCommand::Help),
            "quit" | "exit" | "q" => Ok(ShellCommand::Quit),
            other => Err(format!("unknown command '{other}' (try 'help')")),
        }
    }
}

/// Interactive catalog browser. Search, sort and selection persist across
/// commands for the lifetime of the shell.
pub struct Shell {
    view: CatalogView,
    images: AnalyzeImageUseCase,
}

impl Shell {
    pub fn new(view: CatalogView, images: AnalyzeImageUseCase) -> Self {
        Self { view, images }
    }

    /// Runs one command. Returns the text to show, or `None` to quit.
    pub fn execute(&mut self, command: ShellCommand) -> Result<Option<String>, SessionError> {
        let text = match command {
            ShellCommand::List => format_table(&self.view.visible()),
            ShellCommand::Search { field, term } => {
                self.view.set_search(term, field);
                format_table(&self.view.visible())
            }
            ShellCommand::Clear => {
                self.view.clear_search();
                format_table(&self.view.visible())
            }
            ShellCommand::Sort(column) => {
                let sort = self.view.sort(column);
                format!("{}\n{}", format_sort(sort), format_table(&self.view.visible()))
            }
            ShellCommand::Reset => {
                self.view.reset()?;
                format_table(&self.view.visible())
            }
            ShellCommand::Select(filename) => match self.view.select(&filename)? {
                Some(path) => format!("Selected {filename}: {}", path.display()),
                None => format!("Selected {filename} (image not found)"),
            },
            ShellCommand::Delete(Some(filename)) => {
                self.view.delete(&filename)?;
                format!("Deleted {filename}")
            }
            ShellCommand::Delete(None) => {
                let filename = self.view.delete_selected()?;
                format!("Deleted {filename}")
            }
            ShellCommand::Analyze(path) => {
                format_attributes(&self.images.analyze(Some(&path))?)
            }
            ShellCommand::Save(path) => {
                let record = self.images.save(Some(&path), self.view.store_mut())?;
                format!(
                    "Saved {}\n{}",
                    record.filename,
                    format_attributes(&record.attributes())
                )
            }
            ShellCommand::Help => HELP.to_string(),
            ShellCommand::Quit => return Ok(None),
        };
        Ok(Some(text))
    }

    /// Reads commands line by line until `quit` or end of input.
    ///
    /// Command failures are reported and the shell keeps going.
    pub fn run(&mut self, input: impl BufRead, output: &mut impl Write) -> io::Result<()> {
        write!(output, "> ")?;
        output.flush()?;
        for line in input.lines() {
            let line = line?;
            if !line.trim().is_empty() {
                match line.parse::<ShellCommand>() {
                    Ok(command) => match self.execute(command) {
                        Ok(Some(text)) => writeln!(output, "{text}")?,
                        Ok(None) => return Ok(()),
                        Err(e) if e.is_warning() => writeln!(output, "Warning: {e}")?,
                        Err(e) => {
                            log::error!("{e}");
                            writeln!(output, "Error: {e}")?;
                        }
                    },
                    Err(message) => writeln!(output, "{message}")?,
                }
            }
            write!(output, "> ")?;
            output.flush()?;
        }
        Ok(())
    }
}
