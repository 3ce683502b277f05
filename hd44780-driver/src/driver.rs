//! Driver handle
//!
//! [`Hd44780`] turns display operations into queued instructions. Most
//! commands are fire-and-forget: they queue their nibble pair and return,
//! and the optional notifier reports completion later. Attach, detach and
//! print wait for the bus because each step has to land before the next
//! one is sent.

use core::cell::Cell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use hd44780_core::instruction::{self, CGRAM_SLOTS, CLEAR_DISPLAY, RETURN_HOME};
use hd44780_core::{
    ddram_address, init_sequence, DisplayControl, DriverConfig, EntryMode, InitStep,
    RegisterSelect, ShiftDirection, ShiftTarget,
};

use crate::error::{ConfigurationFault, DriverError};
use crate::notify::Notifier;
use crate::queue::{Request, TransactionQueue};

/// Rows in a 5x8 glyph
const GLYPH_ROWS: usize = 8;

/// Glyph rows only use the low five bits
const GLYPH_ROW_MASK: u8 = 0x1F;

/// Attached HD44780 display
///
/// Share it by reference between tasks; every method takes `&self`. The
/// queue's runner must be active for anything to reach the bus.
pub struct Hd44780<M: RawMutex + Sync + 'static, const N: usize> {
    queue: &'static TransactionQueue<M, N>,
    /// Last display-control mask accepted by the queue
    control: Mutex<M, Cell<DisplayControl>>,
    config: DriverConfig,
}

impl<M: RawMutex + Sync + 'static, const N: usize> Hd44780<M, N> {
    /// Open `queue` and run the power-on initialisation sequence
    ///
    /// Each init step is awaited before the next one is queued. On any
    /// failure the queue is closed again, which also stops its runner.
    ///
    /// # Errors
    ///
    /// [`ConfigurationFault::InvalidConfig`] before touching the queue,
    /// [`ConfigurationFault::Line`] if a line failed during initialisation.
    pub async fn attach(
        queue: &'static TransactionQueue<M, N>,
        config: DriverConfig,
    ) -> Result<Self, ConfigurationFault> {
        config.validate()?;
        queue.open(config.fault_policy);

        for step in init_sequence(&config) {
            let result: Result<(), ConfigurationFault> = match step {
                InitStep::Byte { value, settle_us } => {
                    queue
                        .fenced(None, |fence| {
                            queue.enqueue_byte(
                                RegisterSelect::Instruction,
                                value,
                                settle_us,
                                Some(fence),
                            )
                        })
                        .await
                }
                InitStep::Nibble { value, settle_us } => {
                    queue
                        .fenced(None, |fence| {
                            queue.enqueue(
                                Request::new(RegisterSelect::Instruction, value)
                                    .with_settle(settle_us)
                                    .with_notifier(Some(fence)),
                            )
                        })
                        .await
                }
            };

            if let Err(e) = result {
                #[cfg(feature = "defmt")]
                defmt::error!("LCD init failed: {}", e);
                queue.close();
                return Err(e);
            }
        }

        #[cfg(feature = "defmt")]
        defmt::info!(
            "LCD attached ({}x{})",
            config.geometry.columns,
            config.geometry.rows
        );

        Ok(Self {
            queue,
            control: Mutex::new(Cell::new(DisplayControl::DISPLAY_ONLY)),
            config,
        })
    }

    /// Switch the display off, then close the queue
    ///
    /// The runner returns the bus once this has resolved. The queue is
    /// closed even when the final instruction fails.
    pub async fn detach(self) -> Result<(), DriverError> {
        let off = DisplayControl::OFF.instruction();
        let settle = self.config.timing.instruction_settle_us;
        let result = self
            .queue
            .fenced(None, |fence| {
                self.queue
                    .enqueue_byte(RegisterSelect::Instruction, off, settle, Some(fence))
            })
            .await;
        self.queue.close();

        #[cfg(feature = "defmt")]
        defmt::info!("LCD detached");

        result
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    pub fn queue(&self) -> &'static TransactionQueue<M, N> {
        self.queue
    }

    /// Display-control mask as last accepted by the queue
    pub fn display_control(&self) -> DisplayControl {
        self.control.lock(|control| control.get())
    }

    /// Queue one raw byte to either register
    pub fn write_byte(
        &self,
        register: RegisterSelect,
        byte: u8,
        settle_us: u32,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        self.queue.enqueue_byte(register, byte, settle_us, notifier)?;
        Ok(())
    }

    fn instruction(
        &self,
        byte: u8,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        let settle = self.config.timing.instruction_settle_us;
        self.write_byte(RegisterSelect::Instruction, byte, settle, notifier)
    }

    /// Blank the display and move the cursor home
    pub fn clear(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        let settle = self.config.timing.clear_settle_us;
        self.write_byte(RegisterSelect::Instruction, CLEAR_DISPLAY, settle, notifier)
    }

    /// Cursor to the top-left cell and undo any display shift
    pub fn home(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        let settle = self.config.timing.clear_settle_us;
        self.write_byte(RegisterSelect::Instruction, RETURN_HOME, settle, notifier)
    }

    /// Move the cursor to `(column, row)`
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidPosition`] outside the configured geometry;
    /// nothing is queued in that case.
    pub fn set_cursor(
        &self,
        column: u8,
        row: u8,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        let address = ddram_address(column, row, &self.config.geometry)?;
        self.instruction(instruction::set_ddram_address(address), notifier)
    }

    pub fn blink_on(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_blink(true), notifier)
    }

    pub fn blink_off(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_blink(false), notifier)
    }

    pub fn cursor_on(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_cursor(true), notifier)
    }

    pub fn cursor_off(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_cursor(false), notifier)
    }

    /// Display on (DDRAM content is kept while off)
    pub fn turn_on(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_display(true), notifier)
    }

    pub fn turn_off(&self, notifier: Option<&'static dyn Notifier>) -> Result<(), DriverError> {
        self.update_control(|c| c.with_display(false), notifier)
    }

    /// Apply `change` to the control mask and re-send the whole mask
    ///
    /// The new mask is kept only if the queue accepted the instruction.
    fn update_control(
        &self,
        change: impl FnOnce(DisplayControl) -> DisplayControl,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        self.control.lock(|control| {
            let next = change(control.get());
            self.instruction(next.instruction(), notifier)?;
            control.set(next);
            Ok(())
        })
    }

    /// Move the cursor or scroll the display by one cell
    pub fn shift(
        &self,
        target: ShiftTarget,
        direction: ShiftDirection,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        self.instruction(instruction::shift(target, direction), notifier)
    }

    pub fn set_entry_mode(
        &self,
        mode: EntryMode,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        self.instruction(mode.instruction(), notifier)
    }

    /// Upload a 5x8 glyph into CGRAM `slot` (0-7)
    ///
    /// Queued as one unit: the CGRAM address, the eight rows, then a DDRAM
    /// address of 0 so later writes land on the display again. The glyph
    /// shows wherever character code `slot` is printed.
    ///
    /// # Errors
    ///
    /// [`DriverError::InvalidGlyphSlot`] for a slot past 7.
    pub fn create_char(
        &self,
        slot: u8,
        bitmap: &[u8; GLYPH_ROWS],
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        if slot >= CGRAM_SLOTS {
            return Err(DriverError::InvalidGlyphSlot(slot));
        }

        let mut run = [(RegisterSelect::Data, 0u8); GLYPH_ROWS + 2];
        run[0] = (
            RegisterSelect::Instruction,
            instruction::set_cgram_address(instruction::glyph_address(slot)),
        );
        for (entry, row) in run[1..=GLYPH_ROWS].iter_mut().zip(bitmap) {
            entry.1 = row & GLYPH_ROW_MASK;
        }
        run[GLYPH_ROWS + 1] = (
            RegisterSelect::Instruction,
            instruction::set_ddram_address(0),
        );

        let settle = self.config.timing.instruction_settle_us;
        self.queue.enqueue_bytes(&run, settle, notifier)?;
        Ok(())
    }

    /// Print `text` at the cursor, one character at a time
    ///
    /// Each character waits for the previous one to complete, so other
    /// callers' requests may land between characters but never inside
    /// one. ASCII goes out unchanged; anything else is printed as `?`.
    /// Character ROM glyphs above 0x7F depend on the controller's ROM
    /// variant, so send those with [`write_byte`](Self::write_byte).
    /// `notifier` is attached to the final character. An empty string
    /// notifies `Ok` straight away.
    ///
    /// If a character fails, printing stops and the fault is returned and
    /// passed to `notifier`.
    ///
    /// Dropping the future stops after the character already queued,
    /// which still reaches the display. `notifier` is then never called.
    pub async fn print(
        &self,
        text: &str,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), DriverError> {
        let count = text.chars().count();
        if count == 0 {
            if let Some(notifier) = notifier {
                notifier.notify(Ok(()));
            }
            return Ok(());
        }

        let settle = self.config.timing.instruction_settle_us;
        for (i, c) in text.chars().enumerate() {
            let byte = if c.is_ascii() { c as u8 } else { b'?' };
            let last = i + 1 == count;
            let forward = if last { notifier } else { None };

            let result: Result<(), DriverError> = self
                .queue
                .fenced(forward, |fence| {
                    self.queue
                        .enqueue_byte(RegisterSelect::Data, byte, settle, Some(fence))
                })
                .await;

            if let Err(e) = result {
                if let (false, Some(notifier), DriverError::Transaction(fault)) =
                    (last, notifier, e)
                {
                    notifier.notify(Err(fault));
                }
                return Err(e);
            }
        }
        Ok(())
    }
}
