//! Fuzz target: `wire::decode_response`
//!
//! Drives arbitrary byte sequences through the protocol-boundary decoder
//! and asserts that it never panics and never yields a valid command with
//! a non-positive or non-finite volume.
//!
//! cargo fuzz run fuzz_command_decode

#![no_main]

use libfuzzer_sys::fuzz_target;
use smartgrow::app::commands::Command;
use smartgrow::uplink::wire::{self, DecodedCommand};

fuzz_target!(|data: &[u8]| {
    let Ok(body) = core::str::from_utf8(data) else {
        return;
    };

    if let Ok(batch) = wire::decode_response(body) {
        for entry in batch {
            if let DecodedCommand::Valid { command, .. } = entry {
                let Command::Irrigate { volume_l } = command;
                assert!(
                    volume_l.is_finite() && volume_l > 0.0,
                    "decoder validated a bad volume: {volume_l}"
                );
            }
        }
    }
});
