// Firmware support for the tapdeck macro-pad (ESP32-S3, e-paper, touch)

#![no_std]

pub mod board;
pub mod usb;
