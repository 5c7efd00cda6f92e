//! Fuzz target: the synchronous body-access gate.
//!
//! Arbitrary bodies must never be readable while the flag is disabled, and
//! must read back byte-for-byte once it is enabled.

#![no_main]

use std::io::Read;

use bytes::Bytes;
use http::{HeaderMap, Method};
use libfuzzer_sys::fuzz_target;
use scion_core::{BodyControl, EngineRequest};

fuzz_target!(|data: &[u8]| {
    let control = BodyControl::new();
    let request = EngineRequest::new(
        Method::POST,
        "/",
        HeaderMap::new(),
        Bytes::copy_from_slice(data),
        control.clone(),
    );

    assert!(request.blocking_reader().is_err());

    // Enabling twice must behave the same as enabling once.
    control.allow();
    control.allow();

    let mut reader = match request.blocking_reader() {
        Ok(r) => r,
        Err(_) => panic!("enabled flag must permit reads"),
    };
    let mut buffer = Vec::new();
    if reader.read_to_end(&mut buffer).is_ok() {
        assert_eq!(buffer.as_slice(), data);
    }
});
