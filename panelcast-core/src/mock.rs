//! Recording HAL doubles for host-side tests
//!
//! Every pin write, bus write, bus configuration, delay and resource drop
//! lands in one shared, ordered log so tests can check wire-level ordering.

use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::delay::DelayNs;
use panelcast_hal::{
    Board, FrameLayout, FrameSource, FrameSourceError, Level, OutputPin, PinRole, SpiBus,
    SpiConfig,
};

/// One observable side effect
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Pin(PinRole, Level),
    Write(Vec<u8>),
    Configure(SpiConfig),
    Delay(u32),
    Released(Resource),
}

/// Resource kinds reported on drop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Pin(PinRole),
    Bus,
    Source,
}

/// A command with the data that followed it and the wait after it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transaction {
    pub command: u8,
    pub data: Vec<u8>,
    pub delay_ms: u32,
}

impl Transaction {
    pub fn new(command: u8, data: &[u8]) -> Self {
        Self {
            command,
            data: data.to_vec(),
            delay_ms: 0,
        }
    }

    pub fn with_delay(mut self, delay_ms: u32) -> Self {
        self.delay_ms = delay_ms;
        self
    }
}

/// Shared event log
#[derive(Debug, Clone, Default)]
pub struct Log(Rc<RefCell<Vec<Event>>>);

impl Log {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.0.borrow_mut().push(event);
    }

    pub fn events(&self) -> Vec<Event> {
        self.0.borrow().clone()
    }

    /// Return and clear the log
    pub fn take(&self) -> Vec<Event> {
        core::mem::take(&mut *self.0.borrow_mut())
    }

    /// Bus writes only
    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Write(bytes) => Some(bytes.clone()),
                _ => None,
            })
            .collect()
    }

    /// Resources dropped so far, in order
    pub fn released(&self) -> Vec<Resource> {
        self.0
            .borrow()
            .iter()
            .filter_map(|e| match e {
                Event::Released(r) => Some(*r),
                _ => None,
            })
            .collect()
    }

    /// Decode the log into command transactions using the DC line state
    ///
    /// Data written before any command is ignored.
    pub fn transactions(&self) -> Vec<Transaction> {
        let mut out: Vec<Transaction> = Vec::new();
        let mut dc = Level::Low;

        for event in self.0.borrow().iter() {
            match event {
                Event::Pin(PinRole::DataCommand, level) => dc = *level,
                Event::Write(bytes) if dc == Level::Low => {
                    assert_eq!(bytes.len(), 1, "command write must be one byte");
                    out.push(Transaction::new(bytes[0], &[]));
                }
                Event::Write(bytes) => {
                    if let Some(last) = out.last_mut() {
                        last.data.extend_from_slice(bytes);
                    }
                }
                Event::Delay(ms) => {
                    if let Some(last) = out.last_mut() {
                        last.delay_ms += ms;
                    }
                }
                _ => {}
            }
        }

        out
    }
}

/// Output pin that records its writes
#[derive(Debug)]
pub struct MockPin {
    log: Log,
    role: PinRole,
    fail: bool,
}

impl MockPin {
    pub fn new(log: &Log, role: PinRole) -> Self {
        Self {
            log: log.clone(),
            role,
            fail: false,
        }
    }

    pub fn failing(log: &Log, role: PinRole) -> Self {
        Self {
            log: log.clone(),
            role,
            fail: true,
        }
    }
}

impl OutputPin for MockPin {
    type Error = ();

    fn set(&mut self, level: Level) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        self.log.push(Event::Pin(self.role, level));
        Ok(())
    }
}

impl Drop for MockPin {
    fn drop(&mut self) {
        self.log.push(Event::Released(Resource::Pin(self.role)));
    }
}

/// SPI bus that records writes
#[derive(Debug)]
pub struct MockBus {
    log: Log,
    fail_configure: bool,
    fail_writes: bool,
}

impl MockBus {
    pub fn new(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail_configure: false,
            fail_writes: false,
        }
    }

    pub fn failing_writes(log: &Log) -> Self {
        Self {
            log: log.clone(),
            fail_configure: false,
            fail_writes: true,
        }
    }
}

impl SpiBus for MockBus {
    type Error = ();

    fn configure(&mut self, config: &SpiConfig) -> Result<(), ()> {
        if self.fail_configure {
            return Err(());
        }
        self.log.push(Event::Configure(*config));
        Ok(())
    }

    fn write(&mut self, data: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.log.push(Event::Write(data.to_vec()));
        Ok(())
    }
}

impl Drop for MockBus {
    fn drop(&mut self) {
        self.log.push(Event::Released(Resource::Bus));
    }
}

/// Delay that records instead of sleeping
#[derive(Debug)]
pub struct MockDelay {
    log: Log,
}

impl MockDelay {
    pub fn new(log: &Log) -> Self {
        Self { log: log.clone() }
    }
}

impl DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.log.push(Event::Delay(ns / 1_000_000));
    }

    fn delay_ms(&mut self, ms: u32) {
        self.log.push(Event::Delay(ms));
    }
}

/// In-memory framebuffer
#[derive(Debug)]
pub struct MockSource {
    log: Log,
    data: Vec<u8>,
    layout: FrameLayout,
}

impl MockSource {
    pub fn new(log: &Log, data: Vec<u8>, layout: FrameLayout) -> Self {
        assert!(data.len() >= layout.len());
        Self {
            log: log.clone(),
            data,
            layout,
        }
    }

    /// Tightly packed source for a `width` x `height` panel
    pub fn zeroed(log: &Log, width: usize, height: usize) -> Self {
        let layout = FrameLayout {
            stride: width * 2,
            bytes_per_pixel: 2,
            height,
        };
        Self::new(log, std::vec![0; layout.len()], layout)
    }
}

impl FrameSource for MockSource {
    fn layout(&self) -> FrameLayout {
        self.layout
    }

    fn read(&self, offset: usize, length: usize) -> Result<&[u8], FrameSourceError> {
        self.data
            .get(offset..offset + length)
            .ok_or(FrameSourceError::OutOfBounds)
    }
}

impl Drop for MockSource {
    fn drop(&mut self) {
        self.log.push(Event::Released(Resource::Source));
    }
}

/// Where a [`MockBoard`] should fail
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailAt {
    DcPin,
    ResetPin,
    Bus,
    Configure,
    Source,
    Writes,
}

/// Board handing out recording doubles
#[derive(Debug)]
pub struct MockBoard {
    pub log: Log,
    fail: Option<FailAt>,
    frame: Option<(Vec<u8>, FrameLayout)>,
}

impl MockBoard {
    pub fn new() -> Self {
        Self {
            log: Log::new(),
            fail: None,
            frame: None,
        }
    }

    pub fn failing_at(fail: FailAt) -> Self {
        Self {
            fail: Some(fail),
            ..Self::new()
        }
    }

    /// Framebuffer contents handed out by `frame_source`
    pub fn with_frame(mut self, data: Vec<u8>, layout: FrameLayout) -> Self {
        self.frame = Some((data, layout));
        self
    }

    fn fails(&self, at: FailAt) -> bool {
        self.fail == Some(at)
    }
}

impl Board for MockBoard {
    type Pin = MockPin;
    type Bus = MockBus;
    type Source = MockSource;
    type Error = FailAt;

    fn output_pin(&mut self, role: PinRole) -> Result<MockPin, FailAt> {
        match role {
            PinRole::DataCommand if self.fails(FailAt::DcPin) => Err(FailAt::DcPin),
            PinRole::Reset if self.fails(FailAt::ResetPin) => Err(FailAt::ResetPin),
            _ => Ok(MockPin::new(&self.log, role)),
        }
    }

    fn spi_bus(&mut self) -> Result<MockBus, FailAt> {
        if self.fails(FailAt::Bus) {
            return Err(FailAt::Bus);
        }
        Ok(MockBus {
            log: self.log.clone(),
            fail_configure: self.fails(FailAt::Configure),
            fail_writes: self.fails(FailAt::Writes),
        })
    }

    fn frame_source(&mut self) -> Result<MockSource, FailAt> {
        if self.fails(FailAt::Source) {
            return Err(FailAt::Source);
        }
        let (data, layout) = self.frame.clone().ok_or(FailAt::Source)?;
        Ok(MockSource::new(&self.log, data, layout))
    }
}
