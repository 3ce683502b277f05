//! Simulated bus for host tests
//!
//! Lines and delay share one [`Trace`], which keeps a virtual clock, the
//! current level of every line, and decodes a nibble transaction on each
//! enable falling edge. Delays advance the clock and then yield, the way a
//! timer suspends the runner, so other tasks get polled while a transaction
//! is in progress.
//!
//! The trace panics if any line is written while a delay is pending, or if
//! a line other than enable changes while enable is high. With one bus
//! owner that means a transaction never starts before the previous one has
//! latched and settled.

use std::boxed::Box;
use std::cell::RefCell;
use std::rc::Rc;
use std::vec::Vec;

use embedded_hal::digital::{self, ErrorKind, PinState};
use embedded_hal_async::delay::DelayNs;
use embassy_futures::yield_now;
use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use hd44780_core::RegisterSelect;
use hd44780_hal::{BusPinConfig, Line, LineProvider, LineRole};

use crate::queue::TransactionQueue;
use crate::transport::{BusLines, BusTransport};

/// Pin layout of the simulated bus
pub const LAYOUT: BusPinConfig = BusPinConfig {
    register_select: 0,
    read_write: 1,
    enable: 2,
    data: [4, 5, 6, 7],
};

/// Queue type used by the driver tests
pub type TestQueue = TransactionQueue<CriticalSectionRawMutex, 32>;

/// Leak a value for the `'static` borrows the queue API expects
pub fn leak<T>(value: T) -> &'static T {
    Box::leak(Box::new(value))
}

/// Simulated line failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

impl digital::Error for SimError {
    fn kind(&self) -> ErrorKind {
        ErrorKind::Other
    }
}

/// One decoded nibble transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latched {
    pub register: RegisterSelect,
    pub value: u8,
    /// First line write of the transaction
    pub started_at_ns: u64,
    pub enable_rise_ns: u64,
    pub latched_at_ns: u64,
}

#[derive(Default)]
struct TraceState {
    now_ns: u64,
    /// Indexed by bus position: RS, RW, E, DB4..DB7
    levels: [bool; 7],
    log: Vec<LineRole>,
    writes: usize,
    started_at_ns: u64,
    enable_rise_ns: Option<u64>,
    rises: usize,
    latched: Vec<Latched>,
    fail_at: Option<usize>,
    broken: Vec<u8>,
    /// Enable is high and the nibble has not latched yet
    active: bool,
    /// A delay is suspended
    delaying: bool,
}

/// Shared record of everything the simulated bus did
#[derive(Clone, Default)]
pub struct Trace(Rc<RefCell<TraceState>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh set of bus lines wired to this trace
    pub fn lines(&self) -> BusLines<SimLine> {
        let line = |pin| SimLine {
            pin,
            trace: self.clone(),
        };
        BusLines {
            register_select: line(LAYOUT.register_select),
            read_write: line(LAYOUT.read_write),
            enable: line(LAYOUT.enable),
            data: LAYOUT.data.map(line),
        }
    }

    pub fn delay(&self) -> SimDelay {
        SimDelay {
            trace: self.clone(),
        }
    }

    /// Bus transport with default timing
    pub fn bus(&self) -> BusTransport<SimLine, SimDelay> {
        embassy_futures::block_on(BusTransport::new(
            self.lines(),
            self.delay(),
            &hd44780_core::Timing::default(),
        ))
        .unwrap()
    }

    /// Fail the enable rising edge of the `n`th transaction (0-based)
    pub fn fail_transaction(&self, n: usize) {
        self.0.borrow_mut().fail_at = Some(n);
    }

    /// Make every write to `pin` fail
    pub fn break_pin(&self, pin: u8) {
        self.0.borrow_mut().broken.push(pin);
    }

    /// A transaction is on the wire or its delay has not finished yet
    pub fn mid_transaction(&self) -> bool {
        let s = self.0.borrow();
        s.active || s.delaying
    }

    pub fn now_ns(&self) -> u64 {
        self.0.borrow().now_ns
    }

    pub fn writes(&self) -> usize {
        self.0.borrow().writes
    }

    pub fn levels(&self) -> [bool; 7] {
        self.0.borrow().levels
    }

    pub fn clear_log(&self) {
        self.0.borrow_mut().log.clear();
    }

    /// Roles written since the last [`clear_log`](Self::clear_log)
    pub fn roles_written(&self) -> Vec<LineRole> {
        self.0.borrow().log.clone()
    }

    pub fn transactions(&self) -> Vec<Latched> {
        self.0.borrow().latched.clone()
    }

    /// `(register, nibble)` stream
    pub fn nibbles(&self) -> Vec<(RegisterSelect, u8)> {
        self.transactions()
            .iter()
            .map(|t| (t.register, t.value))
            .collect()
    }

    /// Reassemble nibble pairs starting at nibble index `from`
    ///
    /// Panics if a pair mixes registers, which would mean a pair was split.
    pub fn bytes_from(&self, from: usize) -> Vec<(RegisterSelect, u8)> {
        let nibbles = self.nibbles();
        let tail = &nibbles[from..];
        assert!(tail.len() % 2 == 0, "odd nibble count: {tail:?}");
        tail.chunks(2)
            .map(|pair| {
                assert_eq!(pair[0].0, pair[1].0, "nibble pair split: {pair:?}");
                (pair[0].0, (pair[0].1 << 4) | pair[1].1)
            })
            .collect()
    }

    fn index(pin: u8) -> Option<(usize, LineRole)> {
        LAYOUT
            .assignments()
            .iter()
            .position(|(_, p)| *p == pin)
            .map(|i| (i, LAYOUT.assignments()[i].0))
    }

    fn write(&self, pin: u8, state: PinState) -> Result<(), SimError> {
        let mut s = self.0.borrow_mut();
        let (index, role) = Self::index(pin).ok_or(SimError)?;
        let high = state == PinState::High;

        assert!(!s.delaying, "{role:?} written while a delay is pending");
        if role != LineRole::Enable {
            assert!(!s.active, "{role:?} changed while enable is high");
        }
        if s.broken.contains(&pin) {
            return Err(SimError);
        }
        if role == LineRole::Enable && high {
            let n = s.rises;
            s.rises += 1;
            if s.fail_at == Some(n) {
                return Err(SimError);
            }
        }

        s.writes += 1;
        s.log.push(role);
        if role == LineRole::RegisterSelect {
            s.started_at_ns = s.now_ns;
        }

        let was_high = s.levels[index];
        s.levels[index] = high;

        if role == LineRole::Enable {
            if high && !was_high {
                s.enable_rise_ns = Some(s.now_ns);
                s.active = true;
            } else if !high && was_high {
                let rise = s.enable_rise_ns.take().unwrap_or(s.now_ns);
                let register = if s.levels[0] {
                    RegisterSelect::Data
                } else {
                    RegisterSelect::Instruction
                };
                let value = s.levels[3..]
                    .iter()
                    .enumerate()
                    .fold(0u8, |acc, (bit, high)| acc | (u8::from(*high) << bit));
                let latched = Latched {
                    register,
                    value,
                    started_at_ns: s.started_at_ns,
                    enable_rise_ns: rise,
                    latched_at_ns: s.now_ns,
                };
                s.latched.push(latched);
                s.active = false;
            }
        }
        Ok(())
    }
}

/// Line backed by a [`Trace`]
pub struct SimLine {
    pin: u8,
    trace: Trace,
}

impl Line for SimLine {
    type Error = SimError;

    async fn set_level(&mut self, level: PinState) -> Result<(), Self::Error> {
        self.trace.write(self.pin, level)
    }
}

/// Delay that advances the trace's virtual clock
pub struct SimDelay {
    trace: Trace,
}

impl DelayNs for SimDelay {
    async fn delay_ns(&mut self, ns: u32) {
        {
            let mut s = self.trace.0.borrow_mut();
            s.now_ns += u64::from(ns);
            s.delaying = true;
        }
        yield_now().await;
        self.trace.0.borrow_mut().delaying = false;
    }
}

/// Provider handing out [`SimLine`]s for the pins in [`LAYOUT`]
pub struct SimProvider {
    trace: Trace,
    claimed: Vec<u8>,
}

impl SimProvider {
    pub fn new(trace: &Trace) -> Self {
        Self {
            trace: trace.clone(),
            claimed: Vec::new(),
        }
    }

    /// Pretend `pin` is already in use elsewhere
    pub fn withhold(&mut self, pin: u8) {
        self.claimed.push(pin);
    }
}

impl LineProvider for SimProvider {
    type Line = SimLine;

    fn claim(&mut self, pin: u8) -> Option<SimLine> {
        if self.claimed.contains(&pin) || Trace::index(pin).is_none() {
            return None;
        }
        self.claimed.push(pin);
        Some(SimLine {
            pin,
            trace: self.trace.clone(),
        })
    }
}
