use std::io::Cursor;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{DynamicImage, ImageFormat};
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::analysis::domain::face_analysis::FaceAnalysis;
use crate::analysis::domain::face_analyzer::FaceAnalyzer;
use crate::shared::constants::ANALYZER_ACTIONS;
use crate::shared::frame::Frame;

#[derive(Error, Debug)]
pub enum AnalyzerError {
    #[error("failed to encode frame for analysis: {0}")]
    Encode(#[source] image::ImageError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("analyzer request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("analyzer at {url} answered {status}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },
    #[error("unreadable analyzer response: {0}")]
    Decode(#[source] serde_json::Error),
}

#[derive(Serialize)]
struct AnalyzeRequest<'a> {
    img: String,
    actions: &'a [&'a str],
    enforce_detection: bool,
}

/// The analyzer answers with `{"results": [...]}`, a bare list, or a single
/// object depending on its version.
#[derive(Deserialize)]
#[serde(untagged)]
enum AnalyzeResponse {
    Wrapped { results: ResultList },
    List(Vec<FaceAnalysis>),
    Single(FaceAnalysis),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ResultList {
    Many(Vec<FaceAnalysis>),
    One(FaceAnalysis),
}

/// Talks to a DeepFace-compatible REST service (`POST /analyze`).
///
/// Frames are sent as base64 JPEG data URIs with detection enforcement
/// disabled, so the service answers even when it finds no face.
pub struct HttpFaceAnalyzer {
    client: reqwest::blocking::Client,
    endpoint: String,
}

impl HttpFaceAnalyzer {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, AnalyzerError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(AnalyzerError::Client)?;
        Ok(Self {
            client,
            endpoint: format!("{}/analyze", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn request(&self, frame: &Frame) -> Result<Vec<FaceAnalysis>, AnalyzerError> {
        let body = serde_json::to_string(&AnalyzeRequest {
            img: encode_data_uri(frame)?,
            actions: ANALYZER_ACTIONS,
            enforce_detection: false,
        })
        .map_err(AnalyzerError::Decode)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|source| AnalyzerError::Request {
                url: self.endpoint.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().map_err(|source| AnalyzerError::Request {
            url: self.endpoint.clone(),
            source,
        })?;
        if !status.is_success() {
            return Err(AnalyzerError::Status {
                url: self.endpoint.clone(),
                status: status.as_u16(),
                body: text,
            });
        }
        parse_response(&text)
    }
}

impl FaceAnalyzer for HttpFaceAnalyzer {
    fn analyze(&mut self, frame: &Frame) -> Result<Vec<FaceAnalysis>, Box<dyn std::error::Error>> {
        let results = self.request(frame)?;
        log::debug!(
            "Analyzer returned {} result(s) for frame {}",
            results.len(),
            frame.index()
        );
        Ok(results)
    }
}

fn encode_data_uri(frame: &Frame) -> Result<String, AnalyzerError> {
    let mut jpeg = Vec::new();
    DynamicImage::ImageRgb8(frame.to_rgb_image())
        .write_to(&mut Cursor::new(&mut jpeg), ImageFormat::Jpeg)
        .map_err(AnalyzerError::Encode)?;
    Ok(format!("data:image/jpeg;base64,{}", STANDARD.encode(jpeg)))
}

pub fn parse_response(body: &str) -> Result<Vec<FaceAnalysis>, AnalyzerError> {
    let response: AnalyzeResponse = serde_json::from_str(body).map_err(AnalyzerError::Decode)?;
    Ok(match response {
        AnalyzeResponse::Wrapped {
            results: ResultList::Many(results),
        }
        | AnalyzeResponse::List(results) => results,
        AnalyzeResponse::Wrapped {
            results: ResultList::One(result),
        }
        | AnalyzeResponse::Single(result) => vec![result],
    })
}
