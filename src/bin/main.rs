// tapdeck entry point and main loop
//
// Boot sequence: logger -> hardware -> touch reset -> splash (cold
// boot only) -> USB -> run loop.
// The loop polls touch, dispatches tap zones as HID media keys and
// returns once the pad has sat idle long enough; we then arm the
// touch INT pin and deep sleep. Wake is a reset, so we land back here.
//
// The panel image survives deep sleep, so a pin-alarm wake skips the
// splash and its ~2s refresh.

#![no_std]
#![no_main]

use esp_backtrace as _;
use esp_hal::clock::CpuClock;
use esp_hal::delay::Delay;
use esp_hal::rtc_cntl::{SleepSource, wakeup_cause};
use esp_hal::time::Instant;
use log::{error, info};

use tapdeck::board::{Board, ROTATION};
use tapdeck::usb::UsbHid;
use tapdeck_kernel::frame::Frame;
use tapdeck_kernel::panel::draw_layout;
use tapdeck_kernel::zones::ZONES;
use tapdeck_kernel::{Error, Macropad};

esp_bootloader_esp_idf::esp_app_desc!();

fn now_ms() -> u64 {
    Instant::now().duration_since_epoch().as_millis()
}

// bus faults leave the hardware in an unknown state; reset instead
fn fatal(e: Error) -> ! {
    error!("fatal: {}", e);
    panic!("{}", e)
}

#[esp_hal::main]
fn main() -> ! {
    esp_println::logger::init_logger_from_env();
    let config = esp_hal::Config::default().with_cpu_clock(CpuClock::max());
    let peripherals = esp_hal::init(config);

    let woke_by_touch = matches!(wakeup_cause(), SleepSource::Ext0);
    info!("booting... (wake: {})", if woke_by_touch { "touch" } else { "cold" });

    let mut delay = Delay::new();
    let board = Board::init(peripherals, &mut delay).unwrap_or_else(|e| fatal(e));
    let Board {
        display,
        input,
        power,
        usb,
    } = board;
    let mut epd = display.epd;
    let mut touch = input.touch;
    let mut keys = input.keys;
    info!("hardware initialized.");

    match keys.mask() {
        Ok(0) => {}
        Ok(mask) => info!("keys held at boot: {:03b}", mask),
        Err(e) => fatal(e),
    }

    touch.init(true, &mut delay).unwrap_or_else(|e| fatal(e));

    if !woke_by_touch {
        let mut frame = Frame::new(ROTATION);
        let Ok(()) = draw_layout(ZONES, &mut frame);
        epd.show_frame(frame.data(), &mut delay)
            .and_then(|()| epd.sleep(&mut delay))
            .unwrap_or_else(|e| fatal(e));
        info!("panel drawn.");
    }

    let hid = UsbHid::new(usb);
    let mut clock = now_ms;
    let mut pad = Macropad::new(touch, hid, delay, now_ms());
    info!("ready.");

    match pad.run(&mut clock) {
        Ok(req) => {
            info!("idle for {}s", req.idle_ms / 1000);
            power.deep_sleep(req)
        }
        Err(e) => fatal(e),
    }
}
