//! Transaction queue
//!
//! A strict FIFO of nibble requests in front of the [`BusTransport`].
//! Submitters only ever touch the backlog under a short critical section;
//! the bus itself belongs to the single [`run`](TransactionQueue::run)
//! future, so at most one transaction is on the wire at any instant and
//! notifiers fire in the order requests were submitted.
//!
//! ```text
//!   caller A ──┐
//!   caller B ──┼──► backlog (Deque) ──► run() ──► BusTransport ──► lines
//!   caller C ──┘        ▲                 │
//!                       └── doorbell ◄────┘ (wait when empty)
//! ```

use core::cell::RefCell;

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::blocking_mutex::Mutex;
use embassy_sync::mutex::Mutex as AsyncMutex;
use embassy_sync::signal::Signal;
use embedded_hal_async::delay::DelayNs;
use hd44780_core::instruction::split_byte;
use hd44780_core::{FaultPolicy, Nibble, RegisterSelect};
use hd44780_hal::Line;
use heapless::Deque;

use crate::error::{EnqueueError, TransactionFault};
use crate::notify::{Fence, Notifier};
use crate::transport::BusTransport;

/// One nibble transaction waiting for the bus
#[derive(Clone, Copy)]
pub struct Request {
    pub register: RegisterSelect,
    pub value: Nibble,
    /// Delay after the enable falling edge (µs), 0 for none
    pub settle_us: u32,
    pub notifier: Option<&'static dyn Notifier>,
    /// High half of a byte; its fault is reported with the low half
    leads_pair: bool,
}

impl Request {
    /// Request with no settle delay and no notifier
    pub const fn new(register: RegisterSelect, value: Nibble) -> Self {
        Self {
            register,
            value,
            settle_us: 0,
            notifier: None,
            leads_pair: false,
        }
    }

    const fn high_half(register: RegisterSelect, value: Nibble) -> Self {
        Self {
            leads_pair: true,
            ..Self::new(register, value)
        }
    }

    pub const fn with_settle(mut self, settle_us: u32) -> Self {
        self.settle_us = settle_us;
        self
    }

    pub const fn with_notifier(mut self, notifier: Option<&'static dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}

struct QueueState<const N: usize> {
    pending: Deque<Request, N>,
    in_flight: bool,
    closed: bool,
    degraded: bool,
    policy: FaultPolicy,
}

impl<const N: usize> QueueState<N> {
    fn admit(&self, slots: usize) -> Result<(), EnqueueError> {
        if self.closed {
            return Err(EnqueueError::Detached);
        }
        if self.degraded {
            return Err(EnqueueError::Degraded);
        }
        if N - self.pending.len() < slots {
            return Err(EnqueueError::Full);
        }
        Ok(())
    }
}

/// What the runner does next
enum Step {
    Execute(Request),
    Wait,
    Stop,
}

/// FIFO of nibble requests sharing one bus
///
/// Meant to live in a `static`; every submitting API takes `&self` and
/// never awaits.
pub struct TransactionQueue<M: RawMutex, const N: usize> {
    state: Mutex<M, RefCell<QueueState<N>>>,
    /// Rung by submitters when the backlog gains work or the queue closes
    doorbell: Signal<M, ()>,
    /// Raised by the runner whenever it runs out of work
    idle: Signal<M, ()>,
    fence: Fence<M>,
    /// One fenced operation at a time
    fence_lock: AsyncMutex<M, ()>,
}

impl<M: RawMutex, const N: usize> Default for TransactionQueue<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<M: RawMutex, const N: usize> TransactionQueue<M, N> {
    /// Create a closed queue; attaching a driver opens it
    pub const fn new() -> Self {
        Self {
            state: Mutex::new(RefCell::new(QueueState {
                pending: Deque::new(),
                in_flight: false,
                closed: true,
                degraded: false,
                policy: FaultPolicy::Continue,
            })),
            doorbell: Signal::new(),
            idle: Signal::new(),
            fence: Fence::new(),
            fence_lock: AsyncMutex::new(()),
        }
    }

    /// Append one request
    ///
    /// Never blocks. The runner picks the request up on its next poll.
    ///
    /// # Errors
    ///
    /// [`EnqueueError::Detached`] once the queue is closed,
    /// [`EnqueueError::Degraded`] after a fault under
    /// [`FaultPolicy::Degrade`], [`EnqueueError::Full`] if the backlog has
    /// no free slot.
    pub fn enqueue(&self, request: Request) -> Result<(), EnqueueError> {
        self.submit(1, |pending| {
            // Capacity was checked under the same lock
            let _ = pending.push_back(request);
        })
    }

    /// Append both nibbles of `byte`, high first, as one unit
    ///
    /// The high nibble carries no settle and no notifier; the low nibble
    /// carries both. Either both nibbles are queued back to back or
    /// neither is.
    pub fn enqueue_byte(
        &self,
        register: RegisterSelect,
        byte: u8,
        settle_us: u32,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), EnqueueError> {
        let (high, low) = split_byte(byte);
        self.submit(2, |pending| {
            let _ = pending.push_back(Request::high_half(register, high));
            let _ = pending.push_back(
                Request::new(register, low)
                    .with_settle(settle_us)
                    .with_notifier(notifier),
            );
        })
    }

    /// Append a run of bytes as one unit, each split high nibble first
    ///
    /// Every byte gets `settle_us` after its low nibble. `notifier` rides
    /// on the final nibble. Nothing from another caller can land inside
    /// the run, which matters for multi-byte operations such as CGRAM
    /// uploads where an interleaved data write would go to the wrong RAM.
    /// An empty run queues nothing and never calls `notifier`.
    pub fn enqueue_bytes(
        &self,
        bytes: &[(RegisterSelect, u8)],
        settle_us: u32,
        notifier: Option<&'static dyn Notifier>,
    ) -> Result<(), EnqueueError> {
        let Some(last) = bytes.len().checked_sub(1) else {
            return Ok(());
        };
        self.submit(bytes.len() * 2, |pending| {
            for (i, &(register, byte)) in bytes.iter().enumerate() {
                let (high, low) = split_byte(byte);
                let notifier = if i == last { notifier } else { None };
                let _ = pending.push_back(Request::high_half(register, high));
                let _ = pending.push_back(
                    Request::new(register, low)
                        .with_settle(settle_us)
                        .with_notifier(notifier),
                );
            }
        })
    }

    fn submit(
        &self,
        slots: usize,
        push: impl FnOnce(&mut Deque<Request, N>),
    ) -> Result<(), EnqueueError> {
        let result = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.admit(slots)?;
            push(&mut state.pending);
            Ok(())
        });

        match result {
            Ok(()) => self.doorbell.signal(()),
            Err(_e) => {
                #[cfg(feature = "defmt")]
                defmt::debug!("request rejected: {}", _e);
            }
        }
        result
    }

    /// Accept requests again, clearing any degraded flag
    pub(crate) fn open(&self, policy: FaultPolicy) {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            state.closed = false;
            state.degraded = false;
            state.policy = policy;
        });
        self.doorbell.signal(());
    }

    /// Refuse new requests; the runner returns once the backlog drains
    pub fn close(&self) {
        self.state.lock(|state| state.borrow_mut().closed = true);
        self.doorbell.signal(());
    }

    /// Nothing queued and nothing on the bus
    pub fn is_idle(&self) -> bool {
        self.state.lock(|state| {
            let state = state.borrow();
            state.pending.is_empty() && !state.in_flight
        })
    }

    /// Requests waiting behind the one in flight
    pub fn pending(&self) -> usize {
        self.state.lock(|state| state.borrow().pending.len())
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock(|state| state.borrow().closed)
    }

    /// Whether a fault has put the queue in degraded mode
    pub fn is_degraded(&self) -> bool {
        self.state.lock(|state| state.borrow().degraded)
    }

    /// Drain loop; owns the bus until the queue is closed and empty
    ///
    /// Spawn this once per queue. A runner started before attach waits
    /// for the queue to open. It returns the bus so the lines can be
    /// reused after the driver detaches.
    pub async fn run<L: Line, D: DelayNs>(
        &self,
        mut bus: BusTransport<L, D>,
    ) -> BusTransport<L, D> {
        while self.is_closed() {
            self.doorbell.wait().await;
        }

        // Fault from the high half of the byte being sent
        let mut pair_fault = None;
        loop {
            match self.next_step() {
                Step::Execute(request) => {
                    let result = bus
                        .send_nibble(request.register, request.value, request.settle_us)
                        .await;
                    if let Err(fault) = result {
                        self.record_fault(fault);
                    }

                    let outcome = match pair_fault.take() {
                        Some(fault) => Err(fault),
                        None => result,
                    };
                    if request.leads_pair {
                        pair_fault = outcome.err();
                    } else if let Some(notifier) = request.notifier {
                        notifier.notify(outcome);
                    }
                }
                Step::Wait => {
                    self.idle.signal(());
                    self.doorbell.wait().await;
                }
                Step::Stop => {
                    self.idle.signal(());
                    return bus;
                }
            }
        }
    }

    fn next_step(&self) -> Step {
        self.state.lock(|state| {
            let mut state = state.borrow_mut();
            match state.pending.pop_front() {
                Some(request) => {
                    state.in_flight = true;
                    Step::Execute(request)
                }
                None => {
                    state.in_flight = false;
                    if state.closed {
                        Step::Stop
                    } else {
                        Step::Wait
                    }
                }
            }
        })
    }

    fn record_fault(&self, _fault: TransactionFault) {
        #[cfg(feature = "defmt")]
        defmt::warn!("transaction failed: {}", _fault);

        let degrade = self.state.lock(|state| {
            let mut state = state.borrow_mut();
            let degrade = state.policy == FaultPolicy::Degrade && !state.degraded;
            if degrade {
                state.degraded = true;
            }
            degrade
        });
        if degrade {
            #[cfg(feature = "defmt")]
            defmt::error!("bus fault, refusing new requests until re-attach");
        }
    }

    /// Wait until the backlog is empty and nothing is in flight
    ///
    /// Needs the runner to be active.
    pub async fn wait_idle(&self) {
        let _guard = self.fence_lock.lock().await;
        loop {
            self.idle.reset();
            if self.is_idle() {
                return;
            }
            self.idle.wait().await;
        }
    }
}

impl<M: RawMutex + Sync + 'static, const N: usize> TransactionQueue<M, N> {
    /// Submit requests and wait for the last of them to complete
    ///
    /// `submit` receives the queue's fence as the notifier to attach to
    /// its final request. `forward` is notified from the runner just
    /// before the fence completes.
    ///
    /// Dropping the future after `submit` succeeded leaves the request
    /// queued. It still runs, but neither the fence nor `forward` reports
    /// its completion.
    pub(crate) async fn fenced<E>(
        &'static self,
        forward: Option<&'static dyn Notifier>,
        submit: impl FnOnce(&'static dyn Notifier) -> Result<(), EnqueueError>,
    ) -> Result<(), E>
    where
        E: From<EnqueueError> + From<TransactionFault>,
    {
        let _guard = self.fence_lock.lock().await;
        self.fence.arm(forward);
        if let Err(e) = submit(&self.fence) {
            self.fence.disarm();
            return Err(e.into());
        }
        // Released before the lock
        let _armed = Armed(&self.fence);
        self.fence.wait().await?;
        Ok(())
    }
}

/// Marks the fence abandoned if the waiting future is dropped
struct Armed<'a, M: RawMutex>(&'a Fence<M>);

impl<M: RawMutex> Drop for Armed<'_, M> {
    fn drop(&mut self) {
        self.0.abandon();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{Completion, Outcome};
    use crate::sim::{leak, TestQueue, Trace};
    use embassy_futures::join::{join, join3};
    use embassy_futures::select::{select, Either};
    use embassy_futures::yield_now;
    use embassy_futures::block_on;
    use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
    use embedded_hal::digital::ErrorKind;
    use hd44780_hal::LineRole;
    use proptest::prelude::*;
    use std::sync::Mutex as StdMutex;
    use std::vec::Vec;

    type Done = Completion<CriticalSectionRawMutex>;

    /// Records the order in which notifiers fire
    struct Recorder {
        id: u32,
        log: &'static StdMutex<Vec<(u32, Outcome)>>,
    }

    impl Notifier for Recorder {
        fn notify(&self, outcome: Outcome) {
            self.log.lock().unwrap().push((self.id, outcome));
        }
    }

    fn open_queue() -> &'static TestQueue {
        let queue = leak(TestQueue::new());
        queue.open(FaultPolicy::Continue);
        queue
    }

    fn instr(value: u8) -> Request {
        Request::new(RegisterSelect::Instruction, Nibble::new(value))
    }

    /// Run `client` against `queue` with the runner alongside, then stop
    fn drive(queue: &'static TestQueue, trace: &Trace, client: impl core::future::Future<Output = ()>) {
        let bus = trace.bus();
        block_on(join(queue.run(bus), async {
            client.await;
            queue.close();
        }));
    }

    #[test]
    fn test_new_queue_is_closed() {
        let queue = TestQueue::new();
        assert!(queue.is_closed());
        assert_eq!(queue.enqueue(instr(0x1)), Err(EnqueueError::Detached));
    }

    #[test]
    fn test_runner_waits_for_open() {
        let trace = Trace::new();
        let queue = leak(TestQueue::new());

        block_on(join(queue.run(trace.bus()), async {
            yield_now().await;
            queue.open(FaultPolicy::Continue);
            queue.enqueue(instr(0x4)).unwrap();
            queue.wait_idle().await;
            queue.close();
        }));
        assert_eq!(trace.nibbles(), [(RegisterSelect::Instruction, 0x4)]);
    }

    #[test]
    fn test_high_nibble_fault_reported_with_byte() {
        let trace = Trace::new();
        let queue = open_queue();
        let done: &'static Done = leak(Completion::new());
        trace.fail_transaction(0);

        queue
            .enqueue_byte(RegisterSelect::Data, 0x41, 0, Some(done))
            .unwrap();
        drive(queue, &trace, async {
            queue.wait_idle().await;
        });

        assert!(matches!(done.try_take(), Some(Err(_))));
        // The low half still went out
        assert_eq!(trace.nibbles(), [(RegisterSelect::Data, 0x1)]);
    }

    #[test]
    fn test_enqueue_does_not_run_without_runner() {
        let queue = open_queue();
        queue.enqueue(instr(0x1)).unwrap();
        queue.enqueue(instr(0x2)).unwrap();
        assert_eq!(queue.pending(), 2);
        assert!(!queue.is_idle());
    }

    #[test]
    fn test_full_queue_rejects() {
        let queue = open_queue();
        for _ in 0..32 {
            queue.enqueue(instr(0x0)).unwrap();
        }
        assert_eq!(queue.enqueue(instr(0x0)), Err(EnqueueError::Full));
    }

    #[test]
    fn test_enqueue_byte_is_all_or_nothing() {
        let queue = open_queue();
        for _ in 0..31 {
            queue.enqueue(instr(0x0)).unwrap();
        }
        assert_eq!(
            queue.enqueue_byte(RegisterSelect::Data, 0x41, 0, None),
            Err(EnqueueError::Full)
        );
        assert_eq!(queue.pending(), 31);
    }

    #[test]
    fn test_enqueue_bytes_checks_whole_run() {
        let queue = open_queue();
        for _ in 0..28 {
            queue.enqueue(instr(0x0)).unwrap();
        }
        let run = [
            (RegisterSelect::Instruction, 0x40),
            (RegisterSelect::Data, 0x1F),
            (RegisterSelect::Data, 0x11),
        ];
        assert_eq!(queue.enqueue_bytes(&run, 0, None), Err(EnqueueError::Full));
        assert!(queue.enqueue_bytes(&run[..2], 0, None).is_ok());
        assert_eq!(queue.pending(), 32);
    }

    #[test]
    fn test_runner_drains_in_order() {
        let trace = Trace::new();
        let queue = open_queue();
        queue.enqueue(instr(0x3)).unwrap();
        queue.enqueue_byte(RegisterSelect::Data, 0xA5, 0, None).unwrap();
        queue.enqueue(instr(0xC)).unwrap();

        drive(queue, &trace, async {
            queue.wait_idle().await;
        });

        let nibbles: Vec<u8> = trace.nibbles().iter().map(|(_, v)| *v).collect();
        assert_eq!(nibbles, [0x3, 0xA, 0x5, 0xC]);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_byte_notifier_fires_after_low_nibble() {
        let trace = Trace::new();
        let queue = open_queue();
        let done: &'static Done = leak(Completion::new());

        drive(queue, &trace, async {
            queue
                .enqueue_byte(RegisterSelect::Data, 0x5A, 50, Some(done))
                .unwrap();
            assert_eq!(done.wait().await, Ok(()));
            // Both nibbles and the settle are behind us
            assert_eq!(trace.transactions().len(), 2);
            let low = trace.transactions()[1];
            assert!(trace.now_ns() >= low.latched_at_ns + 50_000);
        });
    }

    #[test]
    fn test_fault_reaches_only_its_own_notifier() {
        let trace = Trace::new();
        let queue = open_queue();
        let log: &'static StdMutex<Vec<(u32, Outcome)>> = leak(StdMutex::new(Vec::new()));
        let first = leak(Recorder { id: 1, log });
        let second = leak(Recorder { id: 2, log });
        trace.fail_transaction(0);

        queue.enqueue(instr(0x1).with_notifier(Some(first))).unwrap();
        queue.enqueue(instr(0x2).with_notifier(Some(second))).unwrap();
        drive(queue, &trace, async {
            queue.wait_idle().await;
        });

        let fault = TransactionFault {
            line: LineRole::Enable,
            kind: ErrorKind::Other,
        };
        assert_eq!(*log.lock().unwrap(), [(1, Err(fault)), (2, Ok(()))]);
        // The runner moved on to the second request
        assert_eq!(trace.nibbles().len(), 1);
        assert!(!queue.is_degraded());
    }

    #[test]
    fn test_degrade_policy_refuses_after_fault() {
        let trace = Trace::new();
        let queue = leak(TestQueue::new());
        queue.open(FaultPolicy::Degrade);
        trace.fail_transaction(0);

        queue.enqueue(instr(0x1)).unwrap();
        queue.enqueue(instr(0x2)).unwrap();
        drive(queue, &trace, async {
            queue.wait_idle().await;
            assert!(queue.is_degraded());
            assert_eq!(queue.enqueue(instr(0x3)), Err(EnqueueError::Degraded));
        });

        // Already queued work still ran
        assert_eq!(trace.nibbles().len(), 1);

        queue.open(FaultPolicy::Degrade);
        assert!(!queue.is_degraded());
        assert!(queue.enqueue(instr(0x3)).is_ok());
    }

    #[test]
    fn test_close_drains_backlog_then_stops() {
        let trace = Trace::new();
        let queue = open_queue();
        queue.enqueue(instr(0x7)).unwrap();
        queue.enqueue(instr(0x8)).unwrap();

        block_on(join(queue.run(trace.bus()), async {
            queue.close();
            assert_eq!(queue.enqueue(instr(0x9)), Err(EnqueueError::Detached));
        }));
        assert_eq!(trace.nibbles().len(), 2);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_fenced_forwards_then_returns() {
        let trace = Trace::new();
        let queue = open_queue();
        let caller: &'static Done = leak(Completion::new());

        drive(queue, &trace, async {
            let result: Result<(), crate::DriverError> = queue
                .fenced(Some(caller), |fence| {
                    queue.enqueue_byte(RegisterSelect::Instruction, 0x01, 0, Some(fence))
                })
                .await;
            assert_eq!(result, Ok(()));
            assert!(caller.is_complete());
        });
    }

    #[test]
    fn test_fenced_reports_rejection() {
        let queue = leak(TestQueue::new());
        let result: Result<(), crate::DriverError> =
            block_on(queue.fenced(None, |fence| queue.enqueue(instr(0x1).with_notifier(Some(fence)))));
        assert_eq!(
            result,
            Err(crate::DriverError::Enqueue(EnqueueError::Detached))
        );
    }

    #[test]
    fn test_submit_while_transaction_in_progress() {
        let trace = Trace::new();
        let queue = open_queue();
        let second: &'static Done = leak(Completion::new());

        drive(queue, &trace, async {
            queue.enqueue(instr(0x1).with_settle(1_000)).unwrap();
            while !trace.mid_transaction() {
                yield_now().await;
            }
            // The runner holds the bus, so this waits in the backlog
            assert!(!queue.is_idle());
            queue.enqueue(instr(0x2).with_notifier(Some(second))).unwrap();
            assert_eq!(queue.pending(), 1);
            assert_eq!(second.wait().await, Ok(()));
        });

        let latched = trace.transactions();
        assert_eq!(trace.nibbles().iter().map(|(_, v)| *v).collect::<Vec<_>>(), [0x1, 0x2]);
        assert!(latched[1].started_at_ns >= latched[0].latched_at_ns + 1_000_000);
    }

    #[test]
    fn test_cancelled_fenced_call_does_not_release_next() {
        let trace = Trace::new();
        let queue = open_queue();
        let caller: &'static Done = leak(Completion::new());

        drive(queue, &trace, async {
            let first = queue.fenced::<crate::DriverError>(None, |fence| {
                queue.enqueue_byte(RegisterSelect::Data, b'a', 0, Some(fence))
            });
            // Polled once, so the byte is queued, then dropped
            let abandoned = select(first, async {}).await;
            assert!(matches!(abandoned, Either::Second(())));

            let result: Result<(), crate::DriverError> = queue
                .fenced(Some(caller), |fence| {
                    queue.enqueue_byte(RegisterSelect::Data, b'Z', 0, Some(fence))
                })
                .await;
            assert_eq!(result, Ok(()));
            assert_eq!(
                trace.bytes_from(0),
                [(RegisterSelect::Data, b'a'), (RegisterSelect::Data, b'Z')]
            );
            assert_eq!(caller.try_take(), Some(Ok(())));
        });
    }

    #[test]
    fn test_late_submitter_waits_its_turn() {
        let trace = Trace::new();
        let queue = open_queue();
        let a: &'static Done = leak(Completion::new());
        let b: &'static Done = leak(Completion::new());

        drive(queue, &trace, async {
            join3(
                async {
                    queue.enqueue_byte(RegisterSelect::Data, 0x11, 0, Some(a)).unwrap();
                    a.wait().await.unwrap();
                },
                async {
                    yield_now().await;
                    queue.enqueue_byte(RegisterSelect::Data, 0x22, 0, Some(b)).unwrap();
                    b.wait().await.unwrap();
                },
                queue.wait_idle(),
            )
            .await;
        });

        assert_eq!(
            trace.bytes_from(0),
            [(RegisterSelect::Data, 0x11), (RegisterSelect::Data, 0x22)]
        );
    }

    proptest! {
        #[test]
        fn prop_bus_and_notifier_order_match_enqueue_order(
            plan in proptest::collection::vec((0u32..4, any::<u8>(), 0u8..3), 1..16)
        ) {
            let trace = Trace::new();
            let queue = open_queue();
            let log: &'static StdMutex<Vec<(u32, Outcome)>> = leak(StdMutex::new(Vec::new()));
            let submitted: &'static StdMutex<Vec<(u32, u8)>> = leak(StdMutex::new(Vec::new()));

            // Each caller submits its share of the plan, yielding between
            // submissions so callers interleave
            let caller = |me: u32| {
                let plan = plan.clone();
                async move {
                    for (id, (owner, byte, pause)) in plan.into_iter().enumerate() {
                        if owner != me {
                            continue;
                        }
                        for _ in 0..pause {
                            yield_now().await;
                        }
                        let id = id as u32;
                        let recorder = leak(Recorder { id, log });
                        submitted.lock().unwrap().push((id, byte));
                        queue
                            .enqueue_byte(RegisterSelect::Data, byte, 0, Some(recorder))
                            .unwrap();
                    }
                }
            };

            drive(queue, &trace, async {
                join(join(caller(0), caller(1)), join(caller(2), caller(3))).await;
                queue.wait_idle().await;
            });

            let submitted = submitted.lock().unwrap().clone();
            let on_bus: Vec<u8> = trace.bytes_from(0).iter().map(|(_, b)| *b).collect();
            let expected: Vec<u8> = submitted.iter().map(|(_, b)| *b).collect();
            prop_assert_eq!(on_bus, expected);

            let notified: Vec<u32> = log.lock().unwrap().iter().map(|(id, _)| *id).collect();
            let order: Vec<u32> = submitted.iter().map(|(id, _)| *id).collect();
            prop_assert_eq!(notified, order);
        }
    }
}
