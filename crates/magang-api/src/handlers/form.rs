//! Multipart form collection

use std::collections::HashMap;

use axum::extract::Multipart;
use magang_core::domain::FileUpload;

use crate::error::ApiError;

/// Text fields and file parts of one multipart body.
#[derive(Debug, Default)]
pub struct FormData {
    fields: HashMap<String, String>,
    files: HashMap<String, FileUpload>,
}

impl FormData {
    pub async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = FormData::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().unwrap_or("").to_string();
            if name.is_empty() {
                continue;
            }

            let file_name = field.file_name().map(|s| s.to_string());
            match file_name {
                Some(file_name) => {
                    let bytes = field.bytes().await?.to_vec();
                    // Browsers send an empty part when no file was chosen.
                    if file_name.is_empty() && bytes.is_empty() {
                        continue;
                    }
                    form.files.insert(name, FileUpload { file_name, bytes });
                }
                None => {
                    let text = field.text().await?;
                    form.fields.insert(name, text);
                }
            }
        }

        Ok(form)
    }

    /// Trimmed text value; blank counts as absent.
    pub fn text(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(|s| s.trim()).filter(|s| !s.is_empty())
    }

    pub fn take_file(&mut self, name: &str) -> Option<FileUpload> {
        self.files.remove(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, extract::FromRequest, http::Request};

    const BOUNDARY: &str = "magang-boundary";

    fn multipart_request(parts: &[(&str, Option<&str>, &[u8])]) -> Request<Body> {
        let mut body = Vec::new();
        for (name, file_name, content) in parts {
            body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
            match file_name {
                Some(file) => body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                        name, file
                    )
                    .as_bytes(),
                ),
                None => body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", name).as_bytes(),
                ),
            }
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

        Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", format!("multipart/form-data; boundary={}", BOUNDARY))
            .body(Body::from(body))
            .unwrap()
    }

    #[tokio::test]
    async fn test_reads_fields_and_files() {
        let request = multipart_request(&[
            ("kegiatan", None, b"  lab session  "),
            ("tanggal", None, b"2024-05-01"),
            ("catatan", None, b"   "),
            ("bukti_foto", Some("foto.JPG"), b"\xff\xd8\xff"),
            ("kosong", Some(""), b""),
        ]);
        let multipart = Multipart::from_request(request, &()).await.unwrap();
        let mut form = FormData::read(multipart).await.unwrap();

        assert_eq!(form.text("kegiatan"), Some("lab session"));
        assert_eq!(form.text("tanggal"), Some("2024-05-01"));
        assert_eq!(form.text("catatan"), None);
        assert!(form.take_file("kosong").is_none());

        let photo = form.take_file("bukti_foto").unwrap();
        assert_eq!(photo.file_name, "foto.JPG");
        assert_eq!(photo.bytes, vec![0xff, 0xd8, 0xff]);
    }
}
