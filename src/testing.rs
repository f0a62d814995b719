//! Register-file test double shared by the unit tests.

use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::vec::Vec;

use crate::interface::RegisterAccess;
use crate::registers::REGISTER_COUNT;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Op {
    Read { reg: u8, len: usize },
    Write { reg: u8, len: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FakeBusError;

/// In-memory register file. Clones share state, so a test can keep a handle
/// (or act as the chip from another thread) after moving one into the driver.
#[derive(Clone)]
pub struct FakeRegisters {
    regs: Arc<Mutex<[u8; REGISTER_COUNT]>>,
    log: Arc<Mutex<Vec<(ThreadId, Op)>>>,
    fail_read: Arc<Mutex<Option<u8>>>,
    fail_write: Arc<Mutex<Option<u8>>>,
}

impl FakeRegisters {
    pub fn new() -> Self {
        Self {
            regs: Arc::new(Mutex::new([0u8; REGISTER_COUNT])),
            log: Arc::new(Mutex::new(Vec::new())),
            fail_read: Arc::new(Mutex::new(None)),
            fail_write: Arc::new(Mutex::new(None)),
        }
    }

    pub fn with(self, reg: u8, data: &[u8]) -> Self {
        self.set(reg, data);
        self
    }

    /// Poke registers directly, as the chip would. Not logged.
    pub fn set(&self, reg: u8, data: &[u8]) {
        let start = reg as usize;
        self.regs.lock().unwrap()[start..start + data.len()].copy_from_slice(data);
    }

    pub fn get(&self, reg: u8) -> u8 {
        self.regs.lock().unwrap()[reg as usize]
    }

    /// Atomically OR bits into a register, as the chip latching a flag.
    pub fn raise(&self, reg: u8, bits: u8) {
        self.regs.lock().unwrap()[reg as usize] |= bits;
    }

    pub fn fail_reads_of(&self, reg: Option<u8>) {
        *self.fail_read.lock().unwrap() = reg;
    }

    pub fn fail_writes_to(&self, reg: Option<u8>) {
        *self.fail_write.lock().unwrap() = reg;
    }

    pub fn ops(&self) -> Vec<Op> {
        self.log.lock().unwrap().iter().map(|&(_, op)| op).collect()
    }

    pub fn ops_by_thread(&self) -> Vec<(ThreadId, Op)> {
        self.log.lock().unwrap().clone()
    }

    pub fn writes(&self) -> Vec<u8> {
        self.ops()
            .into_iter()
            .filter_map(|op| match op {
                Op::Write { reg, .. } => Some(reg),
                Op::Read { .. } => None,
            })
            .collect()
    }

    pub fn clear_log(&self) {
        self.log.lock().unwrap().clear();
    }

    fn record(&self, op: Op) {
        self.log.lock().unwrap().push((thread::current().id(), op));
    }
}

impl RegisterAccess for FakeRegisters {
    type Error = FakeBusError;

    fn bulk_read(&mut self, reg: u8, buf: &mut [u8]) -> Result<(), FakeBusError> {
        self.record(Op::Read { reg, len: buf.len() });
        if *self.fail_read.lock().unwrap() == Some(reg) {
            return Err(FakeBusError);
        }
        let start = reg as usize;
        buf.copy_from_slice(&self.regs.lock().unwrap()[start..start + buf.len()]);
        Ok(())
    }

    fn bulk_write(&mut self, reg: u8, data: &[u8]) -> Result<(), FakeBusError> {
        self.record(Op::Write { reg, len: data.len() });
        if *self.fail_write.lock().unwrap() == Some(reg) {
            return Err(FakeBusError);
        }
        self.set(reg, data);
        Ok(())
    }
}
