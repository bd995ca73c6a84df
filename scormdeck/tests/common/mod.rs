//! Shared fixtures for integration tests: a minimal zip builder and
//! mock implementations of the external collaborators.

#![allow(dead_code)]

use std::collections::HashMap;
use std::io::Write;
use std::sync::Arc;

use byteorder::{LittleEndian, WriteBytesExt};
use bytes::Bytes;
use chrono::Utc;
use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;

use scormdeck::catalog::{CatalogError, CourseCatalog, CourseDescriptor, LearnerDataStore};
use scormdeck::pipeline::{FetchError, FetchResponse, PackageFetcher};
use scormdeck::store::BoxFuture;

/// Manifest used by the concrete end-to-end scenario: SCORM 1.2, one
/// organization, one item referencing resource R1 with href index.html.
pub const MANIFEST_XML: &str = r#"<?xml version="1.0"?>
<manifest identifier="fixture">
  <metadata>
    <schema>ADL SCORM</schema>
    <schemaversion>1.2</schemaversion>
  </metadata>
  <organizations default="ORG">
    <organization identifier="ORG">
      <title>Integration Fixture</title>
      <item identifier="I1" identifierref="R1">
        <title>Lesson One</title>
      </item>
    </organization>
  </organizations>
  <resources>
    <resource identifier="R1" type="webcontent" href="index.html"/>
  </resources>
</manifest>"#;

pub const INDEX_HTML: &[u8] = b"<html><body>integration fixture</body></html>";

/// Build a minimal zip archive from `(name, payload, deflate?)` triples.
pub fn build_zip(entries: &[(&str, &[u8], bool)]) -> Vec<u8> {
    const LOCAL: u32 = 0x0403_4b50;
    const CENTRAL: u32 = 0x0201_4b50;
    const EOCD: u32 = 0x0605_4b50;

    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, payload, deflate) in entries {
        let offset = out.len() as u32;
        let mut crc = Crc::new();
        crc.update(payload);
        let crc = crc.sum();
        let (method, data): (u16, Vec<u8>) = if *deflate {
            let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
            encoder.write_all(payload).unwrap();
            (8, encoder.finish().unwrap())
        } else {
            (0, payload.to_vec())
        };

        out.write_u32::<LittleEndian>(LOCAL).unwrap();
        out.write_u16::<LittleEndian>(20).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.write_u16::<LittleEndian>(method).unwrap();
        out.write_u32::<LittleEndian>(0).unwrap();
        out.write_u32::<LittleEndian>(crc).unwrap();
        out.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        out.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        out.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        out.write_u16::<LittleEndian>(0).unwrap();
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&data);

        central.write_u32::<LittleEndian>(CENTRAL).unwrap();
        central.write_u16::<LittleEndian>(20).unwrap();
        central.write_u16::<LittleEndian>(20).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(method).unwrap();
        central.write_u32::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(crc).unwrap();
        central.write_u32::<LittleEndian>(data.len() as u32).unwrap();
        central.write_u32::<LittleEndian>(payload.len() as u32).unwrap();
        central.write_u16::<LittleEndian>(name.len() as u16).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u16::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(0).unwrap();
        central.write_u32::<LittleEndian>(offset).unwrap();
        central.extend_from_slice(name.as_bytes());
    }

    let cd_offset = out.len() as u32;
    let cd_size = central.len() as u32;
    out.extend_from_slice(&central);

    out.write_u32::<LittleEndian>(EOCD).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    out.write_u16::<LittleEndian>(entries.len() as u16).unwrap();
    out.write_u32::<LittleEndian>(cd_size).unwrap();
    out.write_u32::<LittleEndian>(cd_offset).unwrap();
    out.write_u16::<LittleEndian>(0).unwrap();
    out
}

/// The standard fixture package.
pub fn fixture_zip() -> Vec<u8> {
    build_zip(&[
        ("imsmanifest.xml", MANIFEST_XML.as_bytes(), true),
        ("index.html", INDEX_HTML, false),
        ("media/", b"", false),
        ("media/styles.css", b"body { margin: 0; }", true),
    ])
}

pub fn descriptor(id: &str) -> CourseDescriptor {
    CourseDescriptor {
        id: id.to_string(),
        name: "Integration Fixture".to_string(),
        description: "A tiny course for the integration suite".to_string(),
        category: "testing".to_string(),
        cover_image: None,
        source_package: format!("uploads/{}.zip", id),
        uploaded_at: Utc::now(),
    }
}

/// Fetcher replaying canned bytes, optionally breaking mid-stream.
pub struct MockFetcher {
    declared_length: Option<u64>,
    chunks: Vec<Result<Bytes, FetchError>>,
}

impl MockFetcher {
    pub fn serving(data: &[u8], chunk_size: usize) -> Self {
        Self {
            declared_length: Some(data.len() as u64),
            chunks: data
                .chunks(chunk_size.max(1))
                .map(|c| Ok(Bytes::copy_from_slice(c)))
                .collect(),
        }
    }

    pub fn breaking_after(data: &[u8], chunk_size: usize) -> Self {
        let mut fetcher = Self::serving(data, chunk_size);
        fetcher.declared_length = Some(data.len() as u64 * 2);
        fetcher.chunks.push(Err(FetchError::Stream {
            url: "mock://package".to_string(),
            reason: "connection reset".to_string(),
        }));
        fetcher
    }
}

impl PackageFetcher for MockFetcher {
    fn fetch<'a>(&'a self, _url: &'a str) -> BoxFuture<'a, Result<FetchResponse, FetchError>> {
        let chunks = self.chunks.clone();
        let declared_length = self.declared_length;
        Box::pin(async move {
            Ok(FetchResponse {
                declared_length,
                stream: stream::iter(chunks).boxed(),
            })
        })
    }
}

/// Catalog serving a fixed course list.
pub struct MockCatalog {
    pub courses: Vec<CourseDescriptor>,
}

impl CourseCatalog for MockCatalog {
    fn list_courses(&self) -> BoxFuture<'_, Result<Vec<CourseDescriptor>, CatalogError>> {
        let courses = self.courses.clone();
        Box::pin(async move { Ok(courses) })
    }

    fn get_course<'a>(
        &'a self,
        course_id: &'a str,
    ) -> BoxFuture<'a, Result<CourseDescriptor, CatalogError>> {
        let found = self.courses.iter().find(|c| c.id == course_id).cloned();
        Box::pin(async move {
            found.ok_or_else(|| CatalogError::CourseNotFound(course_id.to_string()))
        })
    }
}

/// Learner data store recording saves in memory.
#[derive(Default)]
pub struct MockLearnerStore {
    pub prior: Option<HashMap<String, String>>,
    pub saved: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

impl LearnerDataStore for MockLearnerStore {
    fn load_runtime_data<'a>(
        &'a self,
        _course_id: &'a str,
        _learner_id: &'a str,
    ) -> BoxFuture<'a, Result<Option<HashMap<String, String>>, CatalogError>> {
        let prior = self.prior.clone();
        Box::pin(async move { Ok(prior) })
    }

    fn save_runtime_data<'a>(
        &'a self,
        _course_id: &'a str,
        _learner_id: &'a str,
        values: HashMap<String, String>,
    ) -> BoxFuture<'a, Result<(), CatalogError>> {
        let saved = Arc::clone(&self.saved);
        Box::pin(async move {
            saved.lock().push(values);
            Ok(())
        })
    }
}
