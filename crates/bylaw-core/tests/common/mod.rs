//! Shared fixtures: generated PDFs and a minimal HTTP server.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lopdf::content::{Content, Operation};
use lopdf::{Document, Object, ObjectId, Stream, dictionary};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Content of one generated page.
pub enum PageSpec<'a> {
    /// A line of text in the page's font.
    Text(&'a str),
    /// Text set in a font the page does not define.
    BrokenFont(&'a str),
    /// No text at all, like a scanned image page.
    Blank,
}

/// Build a PDF with one page per entry.
pub fn build_pdf(pages: &[PageSpec<'_>]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::new();
    for page in pages {
        let operations = match page {
            PageSpec::Text(text) => text_operations("F1", text),
            PageSpec::BrokenFont(text) => text_operations("F9", text),
            PageSpec::Blank => vec![Operation::new("q", vec![]), Operation::new("Q", vec![])],
        };
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

/// Standard padding for password hashing in the PDF security handler.
const PASSWORD_PAD: [u8; 32] = [
    0x28, 0xBF, 0x4E, 0x5E, 0x4E, 0x75, 0x8A, 0x41, 0x64, 0x00, 0x4E, 0x56, 0xFF, 0xFA, 0x01, 0x08,
    0x2E, 0x2E, 0x00, 0xB6, 0xD0, 0x68, 0x3E, 0x80, 0x2F, 0x0C, 0xA9, 0xFE, 0x64, 0x53, 0x69, 0x7A,
];

/// Build a PDF encrypted with 40-bit RC4 under `user_password`.
pub fn build_encrypted_pdf(pages: &[PageSpec<'_>], user_password: &str) -> Vec<u8> {
    let mut doc = Document::load_mem(&build_pdf(pages)).unwrap();
    let file_id = b"bylaw-fixture-id".to_vec();
    doc.trailer.set(
        "ID",
        vec![
            Object::string_literal(file_id.clone()),
            Object::string_literal(file_id),
        ],
    );

    let encrypt_id = doc.add_object(dictionary! {
        "Filter" => "Standard",
        "V" => 1,
        "R" => 2,
        "Length" => 40,
        "O" => Object::string_literal(vec![0x5A; 32]),
        "P" => -4,
        "CF" => dictionary! { "StdCF" => dictionary! { "CFM" => "V2" } },
    });
    doc.trailer.set("Encrypt", encrypt_id);

    let key = lopdf::encryption::get_encryption_key(&doc, user_password, false).unwrap();
    doc.get_object_mut(encrypt_id)
        .and_then(Object::as_dict_mut)
        .unwrap()
        .set("U", Object::string_literal(rc4(&key, &PASSWORD_PAD)));

    // RC4 is symmetric, so the decryption routine also seals.
    let streams: Vec<ObjectId> = doc
        .objects
        .iter()
        .filter(|(id, obj)| **id != encrypt_id && matches!(obj, Object::Stream(_)))
        .map(|(id, _)| *id)
        .collect();
    for id in streams {
        let obj = doc.objects.get_mut(&id).unwrap();
        let sealed = lopdf::encryption::decrypt_object(&key, id, &*obj, false).unwrap();
        if let Object::Stream(stream) = obj {
            stream.set_content(sealed);
        }
    }

    let mut data = Vec::new();
    doc.save_to(&mut data).unwrap();
    data
}

fn rc4(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut s: Vec<u8> = (0..=255).collect();
    let mut j = 0u8;
    for i in 0..256 {
        j = j.wrapping_add(s[i]).wrapping_add(key[i % key.len()]);
        s.swap(i, j as usize);
    }

    let (mut i, mut j) = (0u8, 0u8);
    data.iter()
        .map(|byte| {
            i = i.wrapping_add(1);
            j = j.wrapping_add(s[i as usize]);
            s.swap(i as usize, j as usize);
            byte ^ s[s[i as usize].wrapping_add(s[j as usize]) as usize]
        })
        .collect()
}

fn text_operations(font: &str, text: &str) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![font.into(), 12.into()]),
        Operation::new("Td", vec![72.into(), 720.into()]),
        Operation::new("Tj", vec![Object::string_literal(text)]),
        Operation::new("ET", vec![]),
    ]
}

/// A canned HTTP response.
#[derive(Debug, Clone)]
pub struct Reply {
    pub status: u16,
    pub content_type: &'static str,
    pub body: Vec<u8>,
    pub delay: Duration,
}

impl Reply {
    pub fn ok(content_type: &'static str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status: 200,
            content_type,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    pub fn pdf(body: Vec<u8>) -> Self {
        Self::ok("application/pdf", body)
    }

    pub fn html(body: &str) -> Self {
        Self::ok("text/html; charset=utf-8", body)
    }

    pub fn status(status: u16) -> Self {
        Self {
            status,
            content_type: "text/plain",
            body: b"error".to_vec(),
            delay: Duration::ZERO,
        }
    }

    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// A running test server.
pub struct TestServer {
    pub base_url: String,
    hits: Arc<AtomicUsize>,
}

impl TestServer {
    /// Requests served so far.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Serve responses chosen by `handler(path, request_index)`.
///
/// Every response closes its connection, so each request is one connection.
pub async fn serve<F>(handler: F) -> TestServer
where
    F: Fn(&str, usize) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let handler = Arc::new(handler);

    let counter = hits.clone();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let handler = handler.clone();
            let index = counter.fetch_add(1, Ordering::SeqCst);

            tokio::spawn(async move {
                let mut buf = vec![0u8; 16 * 1024];
                let mut read = 0;
                loop {
                    let n = socket.read(&mut buf[read..]).await.unwrap_or(0);
                    read += n;
                    if n == 0
                        || read == buf.len()
                        || buf[..read].windows(4).any(|w| w == b"\r\n\r\n")
                    {
                        break;
                    }
                }

                let request = String::from_utf8_lossy(&buf[..read]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let reply = handler(&path, index);

                if !reply.delay.is_zero() {
                    tokio::time::sleep(reply.delay).await;
                }

                let head = format!(
                    "HTTP/1.1 {} Test\r\nContent-Type: {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                    reply.status,
                    reply.content_type,
                    reply.body.len()
                );
                let _ = socket.write_all(head.as_bytes()).await;
                let _ = socket.write_all(&reply.body).await;
                let _ = socket.shutdown().await;
            });
        }
    });

    TestServer {
        base_url: format!("http://{}", addr),
        hits,
    }
}
