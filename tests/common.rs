//! Common test utilities shared between integration tests
#![allow(dead_code)]

use base64::{engine::general_purpose, Engine as _};
use kasm_visit::parser;
use kasm_visit::parser::events::{Event, EventRecorder};
use serde::de::{self, Deserializer};
use serde::Deserialize;
use std::fs;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// Captured writer that stores output for testing
#[derive(Clone, Default)]
pub struct CapturedWriter(pub Arc<Mutex<Vec<u8>>>);

impl CapturedWriter {
    pub fn text(&self) -> String {
        String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
    }
}

impl Write for CapturedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Debug)]
pub struct Base64DecodedBytes(pub Vec<u8>);

impl<'de> Deserialize<'de> for Base64DecodedBytes {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s: String = String::deserialize(deserializer)?;
        let decoded = general_purpose::STANDARD.decode(s).map_err(de::Error::custom)?;
        Ok(Base64DecodedBytes(decoded))
    }
}

#[derive(Deserialize, Debug)]
pub struct Fixture {
    pub cases: Vec<Case>,
}

#[derive(Deserialize, Debug)]
pub struct Case {
    pub name: String,
    pub module: Base64DecodedBytes,
    /// The `ErrorKind` the module must fail with, or nothing if it is valid.
    pub expect: Option<String>,
}

pub fn load_fixture(path: &str) -> Fixture {
    let json = fs::read_to_string(path).unwrap_or_else(|e| panic!("failed to read {}: {}", path, e));
    serde_json::from_str(&json).unwrap_or_else(|e| panic!("failed to parse {}: {}", path, e))
}

/// The modules of a fixture that are expected to validate.
pub fn valid_modules(path: &str) -> Vec<(String, Vec<u8>)> {
    load_fixture(path)
        .cases
        .into_iter()
        .filter(|case| case.expect.is_none())
        .map(|case| (case.name, case.module.0))
        .collect()
}

/// Decodes hex, ignoring whitespace so that modules can be laid out by section.
pub fn from_hex(s: &str) -> Vec<u8> {
    let compact: String = s.split_whitespace().collect();
    hex::decode(compact).unwrap()
}

pub fn record(bytes: &[u8]) -> Vec<Event> {
    let mut recorder = EventRecorder::new();
    parser::read(bytes, &mut recorder).unwrap();
    recorder.into_events()
}
