// Macro-pad run loop
//
// One tick: service the HID transport, poll the touch controller,
// check idle time, then run the zone dispatcher. The idle check comes
// first so a release that lands in the same tick as the timeout is
// never acted on.
//
// Deep sleep does not return on wake (the chip restarts from reset),
// so the loop ends by handing a SleepRequest back to the firmware,
// which arms the wake pin and powers down.

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::OutputPin;
use embedded_hal::i2c::I2c;
use log::info;

use crate::dispatch::ZoneDispatcher;
use crate::drivers::icnt86::Icnt86;
use crate::error::Error;
use crate::hid::HidSink;
use crate::power::{IdleTimer, PowerState};

/// Monotonic milliseconds since boot.
pub trait Clock {
    fn now_ms(&mut self) -> u64;
}

impl<F: FnMut() -> u64> Clock for F {
    fn now_ms(&mut self) -> u64 {
        self()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WakeCondition {
    /// Level-triggered: wake while the alarm pin reads low (pull-up on).
    PinLow,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SleepRequest {
    pub wake: WakeCondition,
    pub idle_ms: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tick {
    Continue,
    Sleep(SleepRequest),
}

pub struct Macropad<I2C, TRST, H, D> {
    touch: Icnt86<I2C, TRST>,
    hid: H,
    delay: D,
    dispatcher: ZoneDispatcher,
    idle: IdleTimer,
}

impl<I2C, TRST, H, D> Macropad<I2C, TRST, H, D>
where
    I2C: I2c,
    TRST: OutputPin,
    H: HidSink,
    D: DelayNs,
{
    pub fn new(touch: Icnt86<I2C, TRST>, hid: H, delay: D, now_ms: u64) -> Self {
        Self {
            touch,
            hid,
            delay,
            dispatcher: ZoneDispatcher::new(),
            idle: IdleTimer::new(now_ms),
        }
    }

    pub fn with_idle_timer(mut self, idle: IdleTimer) -> Self {
        self.idle = idle;
        self
    }

    pub fn hid(&self) -> &H {
        &self.hid
    }

    pub fn dispatcher(&self) -> &ZoneDispatcher {
        &self.dispatcher
    }

    pub fn tick<C: Clock>(&mut self, clock: &mut C) -> Result<Tick, Error> {
        self.hid.service();

        // only the first contact matters; the rest of the poll is dropped
        let contact = self.touch.poll_contacts(&mut self.delay)?.next();
        let now = clock.now_ms();

        if let PowerState::SleepDue { idle_ms } = self.idle.observe(now, contact.is_some()) {
            return Ok(Tick::Sleep(SleepRequest {
                wake: WakeCondition::PinLow,
                idle_ms,
            }));
        }

        if let Some(action) = self.dispatcher.update(now, contact) {
            info!("zone: {}", action);
            action.execute(&mut self.hid)?;
        }
        Ok(Tick::Continue)
    }

    /// Tick until the pad has been idle long enough to sleep.
    pub fn run<C: Clock>(&mut self, clock: &mut C) -> Result<SleepRequest, Error> {
        loop {
            if let Tick::Sleep(req) = self.tick(clock)? {
                return Ok(req);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rotation;
    use crate::hid::ConsumerCode;
    use crate::power::IDLE_TIMEOUT_MS;
    use crate::testing::{FakeDelay, FakeHid, FakeI2c, FakeOutput, HidOp};
    use std::collections::VecDeque;
    use std::vec;
    use std::vec::Vec;

    type Pad = Macropad<FakeI2c, FakeOutput, FakeHid, FakeDelay>;

    // Screen point (x, y) under Deg0 comes from raw x = 127 - x.
    fn queue_touch(bus: &FakeI2c, x: u16, y: u16) {
        bus.queue(0x1001, &[1]);
        let [xl, xh] = (127 - x).to_le_bytes();
        let [yl, yh] = y.to_le_bytes();
        bus.queue(0x1002, &[0, yl, yh, xl, xh, 1, 0]);
    }

    fn queue_empty(bus: &FakeI2c) {
        bus.queue(0x1001, &[0]);
    }

    fn pad(bus: &FakeI2c) -> Pad {
        let touch = Icnt86::new(bus.clone(), FakeOutput::default(), Rotation::Deg0);
        Macropad::new(touch, FakeHid::default(), FakeDelay::default(), 0)
    }

    fn clock(times: &[u64]) -> impl FnMut() -> u64 {
        let mut times: VecDeque<u64> = times.iter().copied().collect();
        move || times.pop_front().expect("clock ran out")
    }

    #[test]
    fn tap_sends_consumer_code_on_release() {
        let bus = FakeI2c::new();
        queue_touch(&bus, 70, 10);
        queue_touch(&bus, 70, 10);
        queue_empty(&bus);
        let mut pad = pad(&bus);
        let mut now = clock(&[0, 40, 80]);

        for _ in 0..3 {
            assert_eq!(pad.tick(&mut now).unwrap(), Tick::Continue);
        }
        assert_eq!(
            pad.hid().ops,
            vec![HidOp::Consumer(ConsumerCode::VolumeDecrement)]
        );
        assert_eq!(pad.hid().serviced, 3);
    }

    #[test]
    fn drifting_finger_fires_the_press_zone() {
        let bus = FakeI2c::new();
        queue_touch(&bus, 5, 70); // rewind
        queue_touch(&bus, 100, 100); // play/pause
        queue_empty(&bus);
        let mut pad = pad(&bus);
        let mut now = clock(&[0, 150, 300]);

        for _ in 0..3 {
            pad.tick(&mut now).unwrap();
        }
        assert_eq!(pad.hid().ops, vec![HidOp::Consumer(ConsumerCode::Rewind)]);
    }

    #[test]
    fn run_returns_sleep_request_after_idle() {
        let bus = FakeI2c::new();
        let mut pad = pad(&bus);
        let times: Vec<u64> = vec![1_000, IDLE_TIMEOUT_MS, IDLE_TIMEOUT_MS + 1];
        let mut now = clock(&times);

        let req = pad.run(&mut now).unwrap();
        assert_eq!(
            req,
            SleepRequest {
                wake: WakeCondition::PinLow,
                idle_ms: IDLE_TIMEOUT_MS + 1,
            }
        );
        assert!(pad.hid().ops.is_empty());
    }

    #[test]
    fn sleep_wins_over_a_pending_release() {
        let bus = FakeI2c::new();
        queue_touch(&bus, 10, 10);
        queue_empty(&bus);
        let mut pad = pad(&bus);
        let mut now = clock(&[0, IDLE_TIMEOUT_MS + 1]);

        assert_eq!(pad.tick(&mut now).unwrap(), Tick::Continue);
        assert!(matches!(pad.tick(&mut now).unwrap(), Tick::Sleep(_)));
        assert!(pad.hid().ops.is_empty());
        assert!(pad.dispatcher().session().pressed);
    }

    #[test]
    fn touch_bus_error_stops_the_loop() {
        let bus = FakeI2c::new();
        bus.fail_with(embedded_hal::i2c::ErrorKind::NoAcknowledge(
            embedded_hal::i2c::NoAcknowledgeSource::Address,
        ));
        let mut pad = pad(&bus);
        let mut now = clock(&[]);
        assert!(matches!(pad.run(&mut now), Err(Error::I2c(_))));
    }

    #[test]
    fn hid_failure_propagates() {
        let bus = FakeI2c::new();
        queue_touch(&bus, 10, 10);
        queue_empty(&bus);
        let touch = Icnt86::new(bus.clone(), FakeOutput::default(), Rotation::Deg0);
        let hid = FakeHid {
            refuse: true,
            ..Default::default()
        };
        let mut pad = Macropad::new(touch, hid, FakeDelay::default(), 0);
        let mut now = clock(&[0, 50]);

        pad.tick(&mut now).unwrap();
        assert_eq!(pad.tick(&mut now), Err(Error::Hid));
    }
}
