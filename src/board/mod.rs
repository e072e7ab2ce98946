//! Pico-CapTouch-ePaper-2.9 on an ESP32-S3 BSP
//!
//! Maps the pad's physical hardware to named subsystems. Pin
//! assignments, bus clocks and panel geometry live here so nothing
//! else in the firmware needs to know a GPIO number. See `pins` for
//! the map.

pub mod pins;

use embedded_hal_bus::spi::ExclusiveDevice;
use esp_hal::{
    Blocking,
    delay::Delay,
    gpio::{Input, InputConfig, Level, Output, OutputConfig, Pull, RtcPinWithResistors},
    i2c::master::{Config as I2cConfig, I2c},
    otg_fs::Usb,
    peripherals::{GPIO17, Peripherals},
    rtc_cntl::{
        Rtc,
        sleep::{Ext0WakeupSource, WakeupLevel},
    },
    spi,
    time::Rate,
};
use log::info;
use tapdeck_kernel::drivers::icnt86::Icnt86;
use tapdeck_kernel::drivers::keys::Keys;
use tapdeck_kernel::drivers::ssd1680::{Config as EpdConfig, Ssd1680};
use tapdeck_kernel::{Error, PanelGeometry, Rotation, SleepRequest, WakeCondition};

// Display, landscape with the flex cable on the left
pub const DISPLAY_WIDTH: u16 = 296;
pub const DISPLAY_HEIGHT: u16 = 128;
pub const ROTATION: Rotation = Rotation::Deg270;

pub const GEOMETRY: PanelGeometry = PanelGeometry::new(DISPLAY_WIDTH, DISPLAY_HEIGHT, ROTATION);

pub const EPD_SPI_FREQ_MHZ: u32 = 1;
pub const TOUCH_I2C_FREQ_KHZ: u32 = 100;

// Type Aliases
pub type SpiBus = spi::master::Spi<'static, Blocking>;
pub type SpiDevice = ExclusiveDevice<SpiBus, Output<'static>, Delay>;
pub type Epd = Ssd1680<SpiDevice, Output<'static>, Input<'static>, Output<'static>>;
pub type TouchBus = I2c<'static, Blocking>;
pub type Touch = Icnt86<TouchBus, Output<'static>>;

// Hardware Bundles
/// Display subsystem: the SSD1680, reset and ready to take a frame.
pub struct DisplayHw {
    pub epd: Epd,
}

/// Input subsystem: touch controller plus the three side keys.
pub struct InputHw {
    pub touch: Touch,
    pub keys: Keys<Input<'static>>,
}

/// Power subsystem: RTC control and the pin that wakes us.
pub struct PowerHw {
    pub rtc: Rtc<'static>,
    pub wake: GPIO17<'static>,
}

/// Complete board hardware, ready for driver initialization.
pub struct Board {
    pub display: DisplayHw,
    pub input: InputHw,
    pub power: PowerHw,
    pub usb: Usb<'static>,
}

impl Board {
    pub fn init(p: Peripherals, delay: &mut Delay) -> Result<Self, Error> {
        // Display: SPI bus + EPD
        let cs = Output::new(p.GPIO10, Level::High, OutputConfig::default());
        let dc = Output::new(p.GPIO9, Level::High, OutputConfig::default());
        let rst = Output::new(p.GPIO13, Level::High, OutputConfig::default());
        let busy = Input::new(p.GPIO14, InputConfig::default().with_pull(Pull::None));

        let spi_cfg =
            spi::master::Config::default().with_frequency(Rate::from_mhz(EPD_SPI_FREQ_MHZ));
        let spi_bus = spi::master::Spi::new(p.SPI2, spi_cfg)
            .expect("spi2 config")
            .with_sck(p.GPIO12)
            .with_mosi(p.GPIO11);
        let spi_dev = ExclusiveDevice::new(spi_bus, cs, Delay::new()).expect("epd cs");

        let epd = Ssd1680::new(spi_dev, dc, busy, Some(rst), EpdConfig::new(GEOMETRY), delay)?;

        // Touch: I2C0 + trigger line
        let i2c_cfg = I2cConfig::default().with_frequency(Rate::from_khz(TOUCH_I2C_FREQ_KHZ));
        let i2c = I2c::new(p.I2C0, i2c_cfg)
            .expect("i2c0 config")
            .with_sda(p.GPIO6)
            .with_scl(p.GPIO7);
        let trst = Output::new(p.GPIO16, Level::Low, OutputConfig::default());
        let touch = Icnt86::new(i2c, trst, ROTATION);

        let key_cfg = InputConfig::default().with_pull(Pull::Up);
        let keys = Keys::new([
            Input::new(p.GPIO2, key_cfg),
            Input::new(p.GPIO3, key_cfg),
            Input::new(p.GPIO15, key_cfg),
        ]);

        let usb = Usb::new(p.USB0, p.GPIO20, p.GPIO19);

        let power = PowerHw {
            rtc: Rtc::new(p.LPWR),
            wake: p.GPIO17,
        };

        Ok(Board {
            display: DisplayHw { epd },
            input: InputHw { touch, keys },
            power,
            usb,
        })
    }
}

impl PowerHw {
    /// Arm the wake pin and power down. Execution restarts from reset.
    pub fn deep_sleep(mut self, req: SleepRequest) -> ! {
        let level = match req.wake {
            WakeCondition::PinLow => WakeupLevel::Low,
        };
        self.wake.rtcio_pullup(true);
        let ext0 = Ext0WakeupSource::new(self.wake, level);
        info!("power: deep sleep, wake on GPIO{} low", pins::TP_INT);
        self.rtc.sleep_deep(&[&ext0])
    }
}
