// USB HID transport: boot keyboard (for modifiers) + consumer control
//
// Two HID interfaces on the OTG FS port. The keyboard interface only
// ever carries modifier bits; media keys go out as consumer-page
// usages. The device has to be polled regularly to answer the host,
// which the run loop does through HidSink::service once per tick.

use esp_hal::otg_fs::{Usb, UsbBus};
use log::{info, warn};
use static_cell::StaticCell;
use tapdeck_kernel::Error;
use tapdeck_kernel::hid::{ConsumerCode, HidSink, Keycode};
use usb_device::class_prelude::UsbBusAllocator;
use usb_device::prelude::*;
use usbd_hid::descriptor::{KeyboardReport, MediaKeyboardReport, SerializedDescriptor};
use usbd_hid::hid_class::HIDClass;

const VID_PID: UsbVidPid = UsbVidPid(0x16c0, 0x27db);
const POLL_MS: u8 = 10;

// endpoint busy: poll the device and try again, this many times
const PUSH_ATTEMPTS: u32 = 1000;

static EP_MEMORY: StaticCell<[u32; 1024]> = StaticCell::new();
static USB_BUS: StaticCell<UsbBusAllocator<UsbBus<'static>>> = StaticCell::new();

pub struct UsbHid {
    dev: UsbDevice<'static, UsbBus<'static>>,
    keyboard: HIDClass<'static, UsbBus<'static>>,
    media: HIDClass<'static, UsbBus<'static>>,
    modifiers: u8,
    configured: bool,
}

impl UsbHid {
    /// Must only be called once; the bus allocator lives in a static.
    pub fn new(usb: Usb<'static>) -> Self {
        let ep_memory = EP_MEMORY.init([0; 1024]);
        let bus = USB_BUS.init(UsbBus::new(usb, ep_memory));

        let keyboard = HIDClass::new(bus, KeyboardReport::desc(), POLL_MS);
        let media = HIDClass::new(bus, MediaKeyboardReport::desc(), POLL_MS);

        let dev = UsbDeviceBuilder::new(bus, VID_PID)
            .strings(&[StringDescriptors::default()
                .manufacturer("tapdeck")
                .product("tapdeck macro-pad")
                .serial_number("0001")])
            .expect("usb strings")
            .device_class(0)
            .build();

        Self {
            dev,
            keyboard,
            media,
            modifiers: 0,
            configured: false,
        }
    }

    fn poll(&mut self) {
        self.dev.poll(&mut [&mut self.keyboard, &mut self.media]);
        let configured = self.dev.state() == UsbDeviceState::Configured;
        if configured != self.configured {
            self.configured = configured;
            info!("usb: {}", if configured { "configured" } else { "detached" });
        }
    }

    fn push_keyboard(&mut self) -> Result<(), Error> {
        let report = KeyboardReport {
            modifier: self.modifiers,
            reserved: 0,
            leds: 0,
            keycodes: [0; 6],
        };
        self.push(|hid| hid.keyboard.push_input(&report))
    }

    fn push_media(&mut self, usage_id: u16) -> Result<(), Error> {
        let report = MediaKeyboardReport { usage_id };
        self.push(|hid| hid.media.push_input(&report))
    }

    fn push<F>(&mut self, mut send: F) -> Result<(), Error>
    where
        F: FnMut(&mut Self) -> usb_device::Result<usize>,
    {
        if !self.configured {
            warn!("usb: not configured, report dropped");
            return Ok(());
        }
        for _ in 0..PUSH_ATTEMPTS {
            match send(self) {
                Ok(_) => return Ok(()),
                Err(UsbError::WouldBlock) => self.poll(),
                Err(e) => {
                    warn!("usb: push failed: {:?}", e);
                    return Err(Error::Hid);
                }
            }
        }
        warn!("usb: endpoint stayed busy");
        Err(Error::Hid)
    }
}

impl HidSink for UsbHid {
    fn press(&mut self, keys: &[Keycode]) -> Result<(), Error> {
        for key in keys {
            self.modifiers |= key.modifier_bit();
        }
        self.push_keyboard()
    }

    fn send_consumer(&mut self, code: ConsumerCode) -> Result<(), Error> {
        self.push_media(code.usage())?;
        self.push_media(0)
    }

    fn release_all(&mut self) -> Result<(), Error> {
        self.modifiers = 0;
        self.push_keyboard()
    }

    fn service(&mut self) {
        self.poll();
    }
}
