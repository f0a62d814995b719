//! Alarm interrupt handling
//!
//! The INTA line fires when STATUS1.A1F latches. The handler takes the device
//! lock, reads STATUS1, and if the alarm is latched clears A1F and reports an
//! alarm event to the host. It always answers `Handled`: a bus failure is
//! logged and the next edge retries.

use core::ops::Deref;

use bitflags::bitflags;

use crate::device::Max31335;
use crate::error::Error;
use crate::interface::RegisterAccess;
use crate::registers::{reg, STATUS1_A1F};

bitflags! {
    /// Event bits reported to the host, same values as the Linux RTC core.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct RtcEvents: u32 {
        const IRQF = 0x80;
        const AF = 0x20;
    }
}

/// Host side of alarm notifications.
///
/// Called with the device lock held: implementations must only record or
/// schedule, never call back into the device.
pub trait RtcEventSink {
    fn update_irq(&self, count: u32, events: RtcEvents);
}

impl<T: RtcEventSink + ?Sized> RtcEventSink for &T {
    fn update_irq(&self, count: u32, events: RtcEvents) {
        (**self).update_irq(count, events)
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum IrqReturn {
    Handled,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum AlarmState {
    Idle,
    AlarmLatched,
}

impl AlarmState {
    pub fn from_status(status: u8) -> Self {
        if status & STATUS1_A1F != 0 {
            AlarmState::AlarmLatched
        } else {
            AlarmState::Idle
        }
    }
}

/// Interrupt handler bound to one device and one host sink.
///
/// `handle` takes the device spin lock, so it must run in thread or deferred
/// interrupt context (a threaded IRQ, an RTIC software task). Calling it from
/// a hard ISR that preempted a lock holder spins forever on a single core.
pub struct AlarmIrq<D, S> {
    rtc: D,
    sink: S,
}

impl<D, S, A> AlarmIrq<D, S>
where
    D: Deref<Target = Max31335<A>>,
    S: RtcEventSink,
    A: RegisterAccess,
{
    pub fn new(rtc: D, sink: S) -> Self {
        Self { rtc, sink }
    }

    pub fn handle(&self) -> IrqReturn {
        let mut bus = self.rtc.lock();

        match acknowledge(&mut *bus) {
            Ok(AlarmState::AlarmLatched) => {
                self.sink.update_irq(1, RtcEvents::AF | RtcEvents::IRQF);
            }
            Ok(AlarmState::Idle) => {}
            Err(e) => {
                warn!("MAX31335 alarm IRQ: {}", e.as_str());
            }
        }

        IrqReturn::Handled
    }
}

/// Read STATUS1 and clear A1F if it is latched. Nothing is written when the
/// alarm is idle.
pub fn acknowledge<A: RegisterAccess>(bus: &mut A) -> Result<AlarmState, Error<A::Error>> {
    let status = bus.read(reg::STATUS1).map_err(Error::Bus)?;
    let state = AlarmState::from_status(status);
    if state == AlarmState::AlarmLatched {
        bus.clear_bits(reg::STATUS1, STATUS1_A1F).map_err(Error::Bus)?;
    }
    Ok(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::alarm::AlarmDescriptor;
    use crate::config::Config;
    use crate::device::RtcOps;
    use crate::interface::CachedInterface;
    use crate::registers::{ALARM_SIZE, INT_EN1_A1IE};
    use crate::testing::{FakeRegisters, Op};
    use crate::time::CivilTime;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use std::thread;

    #[derive(Clone, Default)]
    struct CountingSink {
        alarms: Arc<AtomicU32>,
    }

    impl RtcEventSink for CountingSink {
        fn update_irq(&self, count: u32, events: RtcEvents) {
            assert_eq!(events, RtcEvents::AF | RtcEvents::IRQF);
            self.alarms.fetch_add(count, Ordering::SeqCst);
        }
    }

    fn device(fake: &FakeRegisters) -> Max31335<FakeRegisters> {
        let rtc = Max31335::probe(fake.clone(), &Config::new().with_irq(9)).unwrap();
        assert!(rtc.attach_irq(|_| Ok::<(), ()>(())));
        rtc
    }

    #[test]
    fn latched_alarm_is_cleared_and_reported() {
        let fake = FakeRegisters::new().with(reg::STATUS1, &[STATUS1_A1F | 0x10]);
        let rtc = device(&fake);
        let sink = CountingSink::default();
        let irq = AlarmIrq::new(&rtc, sink.clone());

        fake.clear_log();
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 1);
        assert_eq!(fake.get(reg::STATUS1), 0x10);
        assert_eq!(fake.writes(), [reg::STATUS1]);
    }

    #[test]
    fn alarm_status_stays_live_through_cache() {
        let fake = FakeRegisters::new();
        let rtc = Max31335::probe(CachedInterface::new(fake.clone()), &Config::new().with_irq(4)).unwrap();
        assert!(rtc.attach_irq(|_| Ok::<(), ()>(())));
        rtc.set_time(&CivilTime::new(2030, 5, 5, 5, 5, 5)).unwrap();
        rtc.set_alarm(&AlarmDescriptor {
            time: CivilTime::new(2030, 5, 5, 5, 6, 0),
            enabled: true,
            pending: false,
        })
        .unwrap();
        assert!(!rtc.read_alarm().unwrap().pending);

        // chip latches the alarm and ticks behind the shadow
        fake.raise(reg::STATUS1, STATUS1_A1F);
        fake.set(reg::SECONDS, &[0x06]);
        let alarm = rtc.read_alarm().unwrap();
        assert!(alarm.pending && alarm.enabled);
        assert_eq!(rtc.read_time().unwrap().second, 6);

        let sink = CountingSink::default();
        let irq = AlarmIrq::new(&rtc, sink.clone());
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 1);
        assert_eq!(fake.get(reg::STATUS1) & STATUS1_A1F, 0);
        assert!(!rtc.read_alarm().unwrap().pending);

        rtc.alarm_irq_enable(false).unwrap();
        assert_eq!(fake.get(reg::INT_EN1) & INT_EN1_A1IE, 0);
        assert!(!rtc.read_alarm().unwrap().enabled);
    }

    #[test]
    fn spurious_interrupt_only_reads_status() {
        let fake = FakeRegisters::new();
        let rtc = device(&fake);
        let sink = CountingSink::default();
        let irq = AlarmIrq::new(&rtc, sink.clone());

        fake.clear_log();
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(fake.ops(), [Op::Read { reg: reg::STATUS1, len: 1 }]);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn status_read_failure_is_swallowed() {
        let fake = FakeRegisters::new().with(reg::STATUS1, &[STATUS1_A1F]);
        let rtc = device(&fake);
        let sink = CountingSink::default();
        let irq = AlarmIrq::new(&rtc, sink.clone());

        fake.fail_reads_of(Some(reg::STATUS1));
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 0);

        // lock was released: the next edge gets through
        fake.fail_reads_of(None);
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn clear_failure_suppresses_notification() {
        let fake = FakeRegisters::new().with(reg::STATUS1, &[STATUS1_A1F]);
        let rtc = device(&fake);
        let sink = CountingSink::default();
        let irq = AlarmIrq::new(&rtc, sink.clone());

        fake.fail_writes_to(Some(reg::STATUS1));
        assert_eq!(irq.handle(), IrqReturn::Handled);
        assert_eq!(sink.alarms.load(Ordering::SeqCst), 0);
        assert_eq!(fake.get(reg::STATUS1), STATUS1_A1F);
        // device is still usable
        assert!(rtc.read_offset().is_ok());
    }

    #[test]
    fn set_alarm_and_irq_never_interleave() {
        const ROUNDS: u32 = 300;

        let fake = FakeRegisters::new();
        let rtc = Arc::new(device(&fake));
        rtc.set_time(&CivilTime::new(2030, 1, 1, 0, 0, 0)).unwrap();
        fake.clear_log();

        let sink = CountingSink::default();
        let irq = AlarmIrq::new(Arc::clone(&rtc), sink.clone());

        let writer = {
            let rtc = Arc::clone(&rtc);
            thread::spawn(move || {
                for i in 0..ROUNDS {
                    let enabled = i % 2 == 0;
                    let alarm = AlarmDescriptor {
                        time: CivilTime::new(2030, 1, 1, 0, 1, (i % 60) as u8),
                        enabled,
                        pending: false,
                    };
                    rtc.set_alarm(&alarm).unwrap();
                    // only this thread touches INT_EN1; the bit must stick
                    assert_eq!(rtc.read_alarm().unwrap().enabled, enabled);
                }
            })
        };

        let chip = fake.clone();
        let handler = thread::spawn(move || {
            for _ in 0..ROUNDS {
                chip.raise(reg::STATUS1, STATUS1_A1F);
                assert_eq!(irq.handle(), IrqReturn::Handled);
            }
        });

        writer.join().unwrap();
        handler.join().unwrap();

        assert!(sink.alarms.load(Ordering::SeqCst) <= ROUNDS);
        assert_eq!(fake.get(reg::INT_EN1) & INT_EN1_A1IE, 0); // last round disabled

        let log = fake.ops_by_thread();
        for (k, &(tid, op)) in log.iter().enumerate() {
            match op {
                // set_alarm: time burst .. STATUS1 read (+ optional clear) by one thread
                Op::Write { reg: r, len } if r == reg::ALM1_SEC && len == ALARM_SIZE => {
                    let mut j = k + 1;
                    loop {
                        let (t, o) = log[j];
                        assert_eq!(t, tid, "set_alarm interleaved at {}", j);
                        if o == (Op::Read { reg: reg::STATUS1, len: 1 }) {
                            break;
                        }
                        j += 1;
                    }
                    if let Some(&(t, Op::Write { reg: r, .. })) = log.get(j + 1) {
                        if r == reg::STATUS1 {
                            assert_eq!(t, tid);
                        }
                    }
                }
                // every STATUS1 write is the tail of a read-modify-write by the same thread
                Op::Write { reg: r, .. } if r == reg::STATUS1 => {
                    let (t, o) = log[k - 1];
                    assert_eq!(t, tid);
                    assert_eq!(o, Op::Read { reg: reg::STATUS1, len: 1 });
                }
                _ => {}
            }
        }
    }
}
