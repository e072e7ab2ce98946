// Recording fakes for the embedded-hal traits the drivers use.
//
// SPI and DC share one trace so a test can read back the exact
// command/data stream the panel would have seen.

use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, VecDeque};
use std::rc::Rc;
use std::vec::Vec;

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
use embedded_hal::i2c::{self, I2c};
use embedded_hal::spi::{self, Operation, SpiDevice};

use crate::hid::{ConsumerCode, HidSink, Keycode};
use crate::error::Error;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Wire {
    Command(u8),
    Data(Vec<u8>),
    Reset(bool),
}

#[derive(Default)]
struct TraceInner {
    dc_high: bool,
    log: Vec<Wire>,
}

#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<TraceInner>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn take(&self) -> Vec<Wire> {
        core::mem::take(&mut self.0.borrow_mut().log)
    }

    pub fn spi(&self) -> FakeSpi {
        FakeSpi(self.clone())
    }

    pub fn dc(&self) -> FakeDc {
        FakeDc(self.clone())
    }

    pub fn reset_pin(&self) -> FakeReset {
        FakeReset(self.clone())
    }
}

pub struct FakeSpi(Trace);

impl spi::ErrorType for FakeSpi {
    type Error = Infallible;
}

impl SpiDevice for FakeSpi {
    fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
        let mut inner = (self.0).0.borrow_mut();
        for op in operations.iter() {
            if let Operation::Write(bytes) = op {
                let wire = if inner.dc_high {
                    Wire::Data(bytes.to_vec())
                } else {
                    Wire::Command(bytes[0])
                };
                inner.log.push(wire);
            }
        }
        Ok(())
    }
}

pub struct FakeDc(Trace);

impl PinErrorType for FakeDc {
    type Error = Infallible;
}

impl OutputPin for FakeDc {
    fn set_low(&mut self) -> Result<(), Infallible> {
        (self.0).0.borrow_mut().dc_high = false;
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        (self.0).0.borrow_mut().dc_high = true;
        Ok(())
    }
}

pub struct FakeReset(Trace);

impl PinErrorType for FakeReset {
    type Error = Infallible;
}

impl OutputPin for FakeReset {
    fn set_low(&mut self) -> Result<(), Infallible> {
        (self.0).0.borrow_mut().log.push(Wire::Reset(false));
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        (self.0).0.borrow_mut().log.push(Wire::Reset(true));
        Ok(())
    }
}

/// Output pin that only remembers the levels it was driven to.
#[derive(Clone, Default)]
pub struct FakeOutput(pub Rc<RefCell<Vec<bool>>>);

impl PinErrorType for FakeOutput {
    type Error = Infallible;
}

impl OutputPin for FakeOutput {
    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().push(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.borrow_mut().push(true);
        Ok(())
    }
}

/// Input pin replaying scripted levels, then holding `rest`.
pub struct FakeInput {
    script: VecDeque<bool>,
    rest: bool,
}

impl FakeInput {
    pub fn steady(level: bool) -> Self {
        Self {
            script: VecDeque::new(),
            rest: level,
        }
    }

    pub fn scripted(levels: &[bool], rest: bool) -> Self {
        Self {
            script: levels.iter().copied().collect(),
            rest,
        }
    }

    fn sample(&mut self) -> bool {
        self.script.pop_front().unwrap_or(self.rest)
    }
}

impl PinErrorType for FakeInput {
    type Error = Infallible;
}

impl InputPin for FakeInput {
    fn is_high(&mut self) -> Result<bool, Infallible> {
        Ok(self.sample())
    }

    fn is_low(&mut self) -> Result<bool, Infallible> {
        Ok(!self.sample())
    }
}

#[derive(Clone, Default)]
pub struct FakeDelay {
    total_ns: Rc<Cell<u64>>,
}

impl FakeDelay {
    pub fn elapsed_ms(&self) -> u64 {
        self.total_ns.get() / 1_000_000
    }
}

impl DelayNs for FakeDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + ns as u64);
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum I2cOp {
    Write(u8, Vec<u8>),
    Read(u8, usize),
}

#[derive(Default)]
struct I2cInner {
    responses: BTreeMap<u16, VecDeque<Vec<u8>>>,
    pointer: u16,
    log: Vec<I2cOp>,
    fail: Option<i2c::ErrorKind>,
}

/// Register-addressed I2C target. Each two-byte write sets the
/// register pointer; reads pop the next queued reply for it.
#[derive(Clone, Default)]
pub struct FakeI2c(Rc<RefCell<I2cInner>>);

impl FakeI2c {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn queue(&self, reg: u16, reply: &[u8]) {
        self.0
            .borrow_mut()
            .responses
            .entry(reg)
            .or_default()
            .push_back(reply.to_vec());
    }

    pub fn fail_with(&self, kind: i2c::ErrorKind) {
        self.0.borrow_mut().fail = Some(kind);
    }

    pub fn take_log(&self) -> Vec<I2cOp> {
        core::mem::take(&mut self.0.borrow_mut().log)
    }
}

impl i2c::ErrorType for FakeI2c {
    type Error = i2c::ErrorKind;
}

impl I2c for FakeI2c {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [i2c::Operation<'_>],
    ) -> Result<(), i2c::ErrorKind> {
        let mut inner = self.0.borrow_mut();
        if let Some(kind) = inner.fail {
            return Err(kind);
        }
        for op in operations.iter_mut() {
            match op {
                i2c::Operation::Write(bytes) => {
                    if bytes.len() >= 2 {
                        inner.pointer = u16::from_be_bytes([bytes[0], bytes[1]]);
                    }
                    inner.log.push(I2cOp::Write(address, bytes.to_vec()));
                }
                i2c::Operation::Read(buf) => {
                    let reg = inner.pointer;
                    let reply = inner
                        .responses
                        .get_mut(&reg)
                        .and_then(|q| q.pop_front())
                        .unwrap_or_default();
                    buf.fill(0);
                    let n = reply.len().min(buf.len());
                    buf[..n].copy_from_slice(&reply[..n]);
                    inner.log.push(I2cOp::Read(address, buf.len()));
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HidOp {
    Press(Keycode),
    Consumer(ConsumerCode),
    ReleaseAll,
}

#[derive(Default)]
pub struct FakeHid {
    pub ops: Vec<HidOp>,
    pub serviced: u32,
    pub refuse: bool,
}

impl HidSink for FakeHid {
    fn press(&mut self, keys: &[Keycode]) -> Result<(), Error> {
        if self.refuse {
            return Err(Error::Hid);
        }
        self.ops.extend(keys.iter().map(|&k| HidOp::Press(k)));
        Ok(())
    }

    fn send_consumer(&mut self, code: ConsumerCode) -> Result<(), Error> {
        if self.refuse {
            return Err(Error::Hid);
        }
        self.ops.push(HidOp::Consumer(code));
        Ok(())
    }

    fn release_all(&mut self) -> Result<(), Error> {
        if self.refuse {
            return Err(Error::Hid);
        }
        self.ops.push(HidOp::ReleaseAll);
        Ok(())
    }

    fn service(&mut self) {
        self.serviced += 1;
    }
}
