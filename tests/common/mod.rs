//! In-process fakes shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use edgequake_docsum::error::{DocSumError, OcrFault, PdfFault, RenderFault};
use edgequake_docsum::pipeline::ocr::OcrEngine;
use edgequake_docsum::pipeline::pdf_text::PdfTextBackend;
use edgequake_docsum::pipeline::render::PageRasterizer;
use edgequake_docsum::{Collaborators, Resolver, SummaryConfig, SummaryRequest, Summarizer};
use image::{DynamicImage, RgbaImage};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Records the order in which collaborators are called.
pub type CallLog = Arc<Mutex<Vec<&'static str>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub struct FakePdfText {
    pub pages: Vec<String>,
    pub calls: AtomicUsize,
    pub log: CallLog,
}

impl FakePdfText {
    pub fn new(pages: &[&str], log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            calls: AtomicUsize::new(0),
            log,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PdfTextBackend for FakePdfText {
    async fn page_texts(&self, _pdf: &[u8]) -> Result<Vec<String>, PdfFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("pdf_text");
        Ok(self.pages.clone())
    }
}

pub struct FakeRasterizer {
    pub pages: usize,
    pub log: CallLog,
}

#[async_trait]
impl PageRasterizer for FakeRasterizer {
    async fn page_count(&self, _pdf: &[u8]) -> Result<usize, RenderFault> {
        Ok(self.pages)
    }

    async fn render_page(&self, _pdf: &[u8], index: usize) -> Result<DynamicImage, RenderFault> {
        if index >= self.pages {
            return Err(RenderFault::Page {
                page: index + 1,
                detail: "out of range".into(),
            });
        }
        self.log.lock().unwrap().push("render");
        Ok(DynamicImage::ImageRgba8(RgbaImage::new(8, 8)))
    }
}

pub struct FakeOcr {
    pub text: String,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub log: CallLog,
}

impl FakeOcr {
    pub fn new(text: &str, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
            log,
        })
    }

    /// Sleeps for `delay` before every page, like a hung tesseract run.
    pub fn slow(text: &str, delay: Duration, log: CallLog) -> Arc<Self> {
        Arc::new(Self {
            text: text.to_string(),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            log,
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for FakeOcr {
    async fn recognize(&self, _image: &DynamicImage, _languages: &[String]) -> Result<String, OcrFault> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push("ocr");
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.text.clone())
    }
}

/// A resolver wired to fakes, plus handles to inspect them.
pub struct Harness {
    pub resolver: Resolver,
    pub pdf_text: Arc<FakePdfText>,
    pub ocr: Arc<FakeOcr>,
    pub log: CallLog,
}

pub fn harness(config: &SummaryConfig, pdf_pages: &[&str], ocr_text: &str) -> Harness {
    let log = call_log();
    let ocr = FakeOcr::new(ocr_text, log.clone());
    harness_with_ocr(config, pdf_pages, ocr, log)
}

/// [`harness`] around a caller-built OCR fake sharing `log`.
pub fn harness_with_ocr(
    config: &SummaryConfig,
    pdf_pages: &[&str],
    ocr: Arc<FakeOcr>,
    log: CallLog,
) -> Harness {
    let pdf_text = FakePdfText::new(pdf_pages, log.clone());
    let rasterizer = Arc::new(FakeRasterizer {
        pages: pdf_pages.len().max(1),
        log: log.clone(),
    });
    let resolver = Resolver::with_collaborators(
        config,
        Collaborators {
            pdf_text: pdf_text.clone(),
            rasterizer,
            ocr: ocr.clone(),
        },
    )
    .expect("resolver should build");
    Harness {
        resolver,
        pdf_text,
        ocr,
        log,
    }
}

/// Summariser that returns a fixed answer and counts calls.
pub struct FakeSummarizer {
    pub answer: String,
    pub delay: Option<Duration>,
    pub calls: AtomicUsize,
    pub last_request: Mutex<Option<SummaryRequest>>,
}

impl FakeSummarizer {
    pub fn answering(answer: &str) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            delay: None,
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn slow(answer: &str, delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            answer: answer.to_string(),
            delay: Some(delay),
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, request: &SummaryRequest) -> Result<String, DocSumError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        Ok(self.answer.clone())
    }
}

/// Request heads received by a local responder, in arrival order.
pub type RequestLog = Arc<Mutex<Vec<String>>>;

/// Serve one fixed HTTP response to every connection; returns the URL.
pub async fn serve(status: &'static str, content_type: &'static str, body: Vec<u8>) -> String {
    serve_recording(status, content_type, body).await.0
}

/// Like [`serve`], but also records each request head.
pub async fn serve_recording(
    status: &'static str,
    content_type: &'static str,
    body: Vec<u8>,
) -> (String, RequestLog) {
    let head = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        body.len()
    );
    respond_with(head, body).await
}

/// Answer every request with `302 Found` pointing at `location`.
pub async fn redirect_to(location: &str) -> (String, RequestLog) {
    let head = format!(
        "HTTP/1.1 302 Found\r\nLocation: {location}\r\nContent-Length: 0\r\nConnection: close\r\n\r\n"
    );
    respond_with(head, Vec::new()).await
}

async fn respond_with(head: String, body: Vec<u8>) -> (String, RequestLog) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let requests: RequestLog = Arc::new(Mutex::new(Vec::new()));
    let log = requests.clone();
    let response = Arc::new([head.into_bytes(), body].concat());

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };
            let response = response.clone();
            let log = log.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 4096];
                let mut seen = Vec::new();
                while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
                    match socket.read(&mut buf).await {
                        Ok(0) | Err(_) => return,
                        Ok(n) => seen.extend_from_slice(&buf[..n]),
                    }
                }
                log.lock()
                    .unwrap()
                    .push(String::from_utf8_lossy(&seen).into_owned());
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    (format!("http://{addr}/doc"), requests)
}
