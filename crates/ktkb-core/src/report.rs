use heapless::Vec;
use ktkb_common::{dev_trace, dev_warn};
use ringbuffer::{ConstGenericRingBuffer, RingBuffer};

use crate::hid::{HidError, HidSink, KeyCode, KeyboardReport, Mods, Report};

pub const MAX_HELD_KEYS: usize = 16;
pub const REPORT_QUEUE_LEN: usize = 128;

const BOOT_KEYS: usize = 6;

/// Keys and modifiers currently registered for the keyboard report.
///
/// Modifiers are reference counted, so two keys holding the same
/// modifier don't release it until both are up. Weak modifiers are the
/// ones added by keys like `LCTRL(R)`, tracked apart from the real ones.
#[derive(Clone, Debug, Default)]
pub struct KeyboardReportState {
    keys: Vec<KeyCode, MAX_HELD_KEYS>,
    mods: [u8; 8],
    weak_mods: [u8; 8],
    swap_alt_gui: bool,
}

fn add_mods(counts: &mut [u8; 8], mods: Mods) {
    for bit in 0..8 {
        if mods.bits() & (1 << bit) != 0 {
            counts[bit] = counts[bit].saturating_add(1);
        }
    }
}

fn del_mods(counts: &mut [u8; 8], mods: Mods) {
    for bit in 0..8 {
        if mods.bits() & (1 << bit) != 0 {
            counts[bit] = counts[bit].saturating_sub(1);
        }
    }
}

fn mods_of(counts: &[u8; 8]) -> Mods {
    let mut bits = 0u8;
    for (bit, count) in counts.iter().enumerate() {
        if *count > 0 {
            bits |= 1 << bit;
        }
    }
    Mods::from_bits_retain(bits)
}

impl KeyboardReportState {
    pub const fn new() -> Self {
        Self { keys: Vec::new(), mods: [0; 8], weak_mods: [0; 8], swap_alt_gui: false }
    }

    pub fn register_key(&mut self, key: KeyCode) {
        if let Some(m) = key.modifier_bit() {
            add_mods(&mut self.mods, m);
            return;
        }

        if self.keys.push(key).is_err() {
            dev_warn!("Too many keys held, ignoring {:?}", key);
        }
    }

    pub fn unregister_key(&mut self, key: KeyCode) {
        if let Some(m) = key.modifier_bit() {
            del_mods(&mut self.mods, m);
            return;
        }

        if let Some(idx) = self.keys.iter().position(|k| *k == key) {
            self.keys.remove(idx);
        }
    }

    pub fn register_mods(&mut self, mods: Mods) {
        add_mods(&mut self.mods, mods);
    }

    pub fn unregister_mods(&mut self, mods: Mods) {
        del_mods(&mut self.mods, mods);
    }

    pub fn register_weak_mods(&mut self, mods: Mods) {
        add_mods(&mut self.weak_mods, mods);
    }

    pub fn unregister_weak_mods(&mut self, mods: Mods) {
        del_mods(&mut self.weak_mods, mods);
    }

    /// Drops every weak modifier, even those of keys still held.
    pub fn clear_weak_mods(&mut self) {
        self.weak_mods = [0; 8];
    }

    pub fn set_swap_alt_gui(&mut self, swap: bool) {
        self.swap_alt_gui = swap;
    }

    /// Modifiers that would be reported right now.
    pub fn mods(&self) -> Mods {
        let mods = mods_of(&self.mods).union(mods_of(&self.weak_mods));
        if self.swap_alt_gui { mods.swap_alt_gui() } else { mods }
    }

    pub fn is_key_registered(&self, key: KeyCode) -> bool {
        match key.modifier_bit() {
            Some(m) => mods_of(&self.mods).contains(m),
            None => self.keys.contains(&key),
        }
    }

    pub fn clear(&mut self) {
        self.keys.clear();
        self.mods = [0; 8];
        self.weak_mods = [0; 8];
    }

    /// Builds the boot protocol report. When more than six different
    /// keys are held every slot carries `ErrorRollOver`.
    pub fn report(&self) -> KeyboardReport {
        let mut distinct: Vec<KeyCode, MAX_HELD_KEYS> = Vec::new();
        for key in self.keys.iter() {
            if !distinct.contains(key) {
                let _ = distinct.push(*key);
            }
        }

        let mut report = KeyboardReport { modifiers: self.mods().bits(), ..Default::default() };
        if distinct.len() > BOOT_KEYS {
            report.keycodes = [KeyCode::ErrorRollOver.usage(); BOOT_KEYS];
        } else {
            for (slot, key) in report.keycodes.iter_mut().zip(distinct.iter()) {
                *slot = key.usage();
            }
        }
        report
    }
}

/// Reports waiting to be accepted by the host.
pub struct ReportQueue {
    queue: ConstGenericRingBuffer<Report, REPORT_QUEUE_LEN>,
}

impl ReportQueue {
    pub const fn new() -> Self {
        Self { queue: ConstGenericRingBuffer::new() }
    }

    pub fn push(&mut self, report: Report) {
        if self.queue.is_full() {
            dev_warn!("Report queue full, dropping the oldest report");
        }
        dev_trace!("Queued report {:?}", report);
        self.queue.push(report);
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Sends as many queued reports as the sink accepts, in order.
    pub fn flush<S: HidSink + ?Sized>(&mut self, sink: &mut S) {
        while let Some(report) = self.queue.peek() {
            match sink.send_report(report) {
                Ok(()) => {
                    let _ = self.queue.dequeue();
                }
                Err(HidError::WouldBlock) => break,
                Err(HidError::Disconnected) => {
                    dev_warn!("Host disconnected, dropping {} reports", self.queue.len());
                    self.queue.clear();
                    break;
                }
            }
        }
    }
}

impl Default for ReportQueue {
    fn default() -> Self {
        Self::new()
    }
}
