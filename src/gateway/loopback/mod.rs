/*!
 * Loopback Device
 *
 * In-process stand-in for the microcontroller. Executes the same remote
 * operations a real board firmware would:
 *
 * - `deref`: little-endian 1/2/4-byte reads and writes inside the RAM window
 * - `malloc` / `free`: a best-fit heap over the RAM window (`malloc` returns 0 on exhaustion)
 * - peripheral calls: accepted and journaled
 *
 * The journal keeps the most recent calls only, up to a fixed capacity.
 *
 * Interrupts are raised from the host side with [`LoopbackDevice::raise_interrupt`]
 * and arrive on the same inbound channel a serial link would feed.
 */

mod heap;

use super::traits::Transport;
use super::types::{ops, CallRequest, GatewayError, GatewayResult, InterruptEvent, Reply, ReturnKind};
use crate::core::config::HostConfig;
use crate::core::limits::{LOOPBACK_JOURNAL_CAPACITY, NULL_ADDRESS};
use crate::core::types::{Address, IrqNumber, Size, Word};
use crate::memory::ElementWidth;
use flume::{Receiver, Sender, TrySendError};
use heap::LoopbackHeap;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// A call the loopback device executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalEntry {
    pub operation: String,
    pub args: Vec<Word>,
}

struct DeviceState {
    base: Address,
    ram: Vec<u8>,
    heap: LoopbackHeap,
    // Remaining calls to fail with a transport error
    injected_failures: u32,
    journal: VecDeque<JournalEntry>,
}

/// Simulated device reachable through the [`Transport`] interface
///
/// Clones share the same device; keep one to inspect state or raise
/// interrupts after handing another to a gateway.
#[derive(Clone)]
pub struct LoopbackDevice {
    state: Arc<Mutex<DeviceState>>,
    events_tx: Sender<InterruptEvent>,
    events_rx: Receiver<InterruptEvent>,
    interrupt_lines: IrqNumber,
}

impl LoopbackDevice {
    pub fn new(config: &HostConfig) -> Self {
        let (events_tx, events_rx) = flume::bounded(config.event_capacity);
        info!(
            base = format_args!("0x{:08x}", config.loopback_ram_base),
            ram = config.loopback_ram_size,
            irq_lines = config.interrupt_lines,
            "Loopback device initialized"
        );
        Self {
            state: Arc::new(Mutex::new(DeviceState {
                base: config.loopback_ram_base,
                ram: vec![0; config.loopback_ram_size],
                heap: LoopbackHeap::new(config.loopback_ram_base, config.loopback_ram_size),
                injected_failures: 0,
                journal: VecDeque::with_capacity(LOOPBACK_JOURNAL_CAPACITY),
            })),
            events_tx,
            events_rx,
            interrupt_lines: config.interrupt_lines,
        }
    }

    /// Signal that interrupt `irq` fired
    pub fn raise_interrupt(&self, irq: IrqNumber) -> GatewayResult<()> {
        if irq >= self.interrupt_lines {
            return Err(GatewayError::device_fault(
                "interrupt",
                format!("no interrupt line {} (device has {})", irq, self.interrupt_lines),
            ));
        }

        match self.events_tx.try_send(InterruptEvent::new(irq)) {
            Ok(()) => {
                debug!(irq, "Interrupt raised");
                Ok(())
            }
            Err(TrySendError::Full(_)) => {
                warn!(irq, "Interrupt event queue full, event lost");
                Err(GatewayError::transport("interrupt", "event queue full"))
            }
            Err(TrySendError::Disconnected(_)) => {
                Err(GatewayError::transport("interrupt", "event channel closed"))
            }
        }
    }

    /// Fail the next `count` calls with a transport error
    pub fn fail_next_calls(&self, count: u32) {
        self.state.lock().injected_failures = count;
    }

    /// Calls executed so far, oldest first
    pub fn journal(&self) -> Vec<JournalEntry> {
        self.state.lock().journal.iter().cloned().collect()
    }

    /// Number of executed calls named `operation`
    pub fn count_calls(&self, operation: &str) -> usize {
        self.state
            .lock()
            .journal
            .iter()
            .filter(|e| e.operation == operation)
            .count()
    }

    pub fn heap_used_bytes(&self) -> Size {
        self.state.lock().heap.used_bytes()
    }

    pub fn heap_free_bytes(&self) -> Size {
        self.state.lock().heap.free_bytes()
    }

    pub fn live_blocks(&self) -> usize {
        self.state.lock().heap.live_blocks()
    }
}

impl DeviceState {
    fn execute(&mut self, request: &CallRequest<'_>) -> GatewayResult<Reply> {
        let op = request.operation;
        match (op, request.args) {
            (ops::DEREF, &[address, width]) => {
                expect_kind(request, ReturnKind::Int)?;
                let (offset, width) = self.locate(op, address, width)?;
                Ok(Reply::Int(self.read(offset, width)))
            }
            (ops::DEREF, &[address, width, value]) => {
                expect_kind(request, ReturnKind::Void)?;
                let (offset, width) = self.locate(op, address, width)?;
                self.write(offset, width, value);
                Ok(Reply::Void)
            }
            (ops::MALLOC, &[size]) => {
                let size = Size::try_from(size).map_err(|_| {
                    GatewayError::device_fault(op, format!("invalid size {}", size))
                })?;
                let address = self.heap.malloc(size).unwrap_or(NULL_ADDRESS);
                Ok(Reply::Int(Word::from(address)))
            }
            (ops::FREE, &[address]) => {
                let freed = Address::try_from(address)
                    .map(|a| self.heap.free(a))
                    .unwrap_or(false);
                if !freed {
                    return Err(GatewayError::device_fault(
                        op,
                        format!("0x{:x} is not an allocated block", address),
                    ));
                }
                Ok(Reply::Void)
            }
            (ops::ROBOVERO_CONFIG | ops::HEARTBEAT_ON | ops::HEARTBEAT_OFF, &[])
            | (ops::INIT_MATCH | ops::PWM_COUNTER_STATE, &[_, _])
            | (ops::PWM_SET_SPEED, &[_, _, _]) => Ok(Reply::Void),
            _ => Err(GatewayError::device_fault(
                op,
                format!("unknown operation or bad arity ({} args)", request.args.len()),
            )),
        }
    }

    /// Translate a device address into a RAM offset, checking the whole cell
    fn locate(&self, op: &str, address: Word, width: Word) -> GatewayResult<(usize, ElementWidth)> {
        let width = usize::try_from(width)
            .ok()
            .and_then(ElementWidth::from_bytes)
            .ok_or_else(|| GatewayError::device_fault(op, format!("unsupported width {}", width)))?;

        let base = Word::from(self.base);
        if address < base || (address - base) as u64 + width.bytes() as u64 > self.ram.len() as u64
        {
            return Err(GatewayError::device_fault(
                op,
                format!("unmapped address 0x{:x}", address),
            ));
        }
        Ok(((address - base) as usize, width))
    }

    fn read(&self, offset: usize, width: ElementWidth) -> Word {
        let mut bytes = [0u8; 8];
        bytes[..width.bytes()].copy_from_slice(&self.ram[offset..offset + width.bytes()]);
        i64::from_le_bytes(bytes)
    }

    fn write(&mut self, offset: usize, width: ElementWidth, value: Word) {
        let bytes = value.to_le_bytes();
        self.ram[offset..offset + width.bytes()].copy_from_slice(&bytes[..width.bytes()]);
    }
}

fn expect_kind(request: &CallRequest<'_>, kind: ReturnKind) -> GatewayResult<()> {
    if request.kind != kind {
        return Err(GatewayError::device_fault(
            request.operation,
            format!("expected a {} call, got {}", kind, request.kind),
        ));
    }
    Ok(())
}

impl Transport for LoopbackDevice {
    fn exchange(&mut self, request: &CallRequest<'_>) -> GatewayResult<Reply> {
        let mut state = self.state.lock();

        if state.injected_failures > 0 {
            state.injected_failures -= 1;
            return Err(GatewayError::transport(request.operation, "injected link failure"));
        }

        if state.journal.len() == LOOPBACK_JOURNAL_CAPACITY {
            state.journal.pop_front();
        }
        state.journal.push_back(JournalEntry {
            operation: request.operation.to_string(),
            args: request.args.to_vec(),
        });
        state.execute(request)
    }

    fn interrupt_events(&self) -> Option<Receiver<InterruptEvent>> {
        Some(self.events_rx.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device() -> LoopbackDevice {
        LoopbackDevice::new(&HostConfig {
            loopback_ram_size: 64,
            ..HostConfig::default()
        })
    }

    fn call(dev: &mut LoopbackDevice, op: &str, kind: ReturnKind, args: &[Word]) -> GatewayResult<Reply> {
        dev.exchange(&CallRequest {
            operation: op,
            kind,
            args,
        })
    }

    #[test]
    fn test_deref_round_trip_little_endian() {
        let mut dev = device();
        let base = Word::from(HostConfig::default().loopback_ram_base);
        call(&mut dev, ops::DEREF, ReturnKind::Void, &[base, 4, 0x1234_5678]).unwrap();
        assert_eq!(
            call(&mut dev, ops::DEREF, ReturnKind::Int, &[base, 1]).unwrap(),
            Reply::Int(0x78)
        );
        assert_eq!(
            call(&mut dev, ops::DEREF, ReturnKind::Int, &[base + 2, 2]).unwrap(),
            Reply::Int(0x1234)
        );
    }

    #[test]
    fn test_deref_outside_window_faults() {
        let mut dev = device();
        let base = Word::from(HostConfig::default().loopback_ram_base);
        assert!(matches!(
            call(&mut dev, ops::DEREF, ReturnKind::Int, &[base + 62, 4]),
            Err(GatewayError::DeviceFault { .. })
        ));
        assert!(matches!(
            call(&mut dev, ops::DEREF, ReturnKind::Int, &[0, 1]),
            Err(GatewayError::DeviceFault { .. })
        ));
        assert!(matches!(
            call(&mut dev, ops::DEREF, ReturnKind::Int, &[base, 3]),
            Err(GatewayError::DeviceFault { .. })
        ));
    }

    #[test]
    fn test_malloc_returns_null_when_exhausted() {
        let mut dev = device();
        assert!(matches!(
            call(&mut dev, ops::MALLOC, ReturnKind::Int, &[64]).unwrap(),
            Reply::Int(a) if a != 0
        ));
        assert_eq!(
            call(&mut dev, ops::MALLOC, ReturnKind::Int, &[4]).unwrap(),
            Reply::Int(0)
        );
    }

    #[test]
    fn test_injected_failures_are_not_journaled() {
        let mut dev = device();
        dev.fail_next_calls(1);
        assert!(matches!(
            call(&mut dev, ops::HEARTBEAT_ON, ReturnKind::Void, &[]),
            Err(GatewayError::Transport { .. })
        ));
        assert!(call(&mut dev, ops::HEARTBEAT_ON, ReturnKind::Void, &[]).is_ok());
        assert_eq!(dev.count_calls(ops::HEARTBEAT_ON), 1);
    }

    #[test]
    fn test_journal_keeps_most_recent_calls() {
        let mut dev = device();
        for i in 0..LOOPBACK_JOURNAL_CAPACITY + 10 {
            call(&mut dev, ops::INIT_MATCH, ReturnKind::Void, &[0, i as Word]).unwrap();
        }

        let journal = dev.journal();
        assert_eq!(journal.len(), LOOPBACK_JOURNAL_CAPACITY);
        assert_eq!(journal[0].args, vec![0, 10]);
        assert_eq!(
            journal.last().unwrap().args,
            vec![0, (LOOPBACK_JOURNAL_CAPACITY + 9) as Word]
        );
    }

    #[test]
    fn test_raise_interrupt_checks_line() {
        let dev = device();
        let events = dev.interrupt_events().unwrap();
        dev.raise_interrupt(3).unwrap();
        assert_eq!(events.try_recv().unwrap(), InterruptEvent::new(3));
        assert!(dev.raise_interrupt(HostConfig::default().interrupt_lines).is_err());
    }
}
