//! # Interrupt Dispatch
//!
//! Every source position of IRQ_STAT maps to an [`IrqAction`]. Only sample
//! completion does real work; the other named sources are logged and
//! acknowledged. Positions with no named source are traced and
//! acknowledged.
//!
//! The scan runs in interrupt context, so actions are reported to a
//! callback which is expected to do no more than post a light event.

use scp_core::FwkResult;
use scp_hal::mgi::{IrqSource, Mgi};
use static_assertions::const_assert;

/// What to do when a source fires
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IrqAction {
    /// A sample set is complete: announce new data
    SampleComplete,
    /// Log and acknowledge
    Ignore,
}

const TABLE_LEN: usize = IrqSource::MAX as usize;

// Dispatch scans a 32-bit status register
const_assert!(TABLE_LEN <= 32);
const_assert!(IrqSource::ALL.len() <= TABLE_LEN);

const fn build_table() -> [Option<IrqAction>; TABLE_LEN] {
    let mut table = [None; TABLE_LEN];
    let mut i = 0;
    while i < IrqSource::ALL.len() {
        let source = IrqSource::ALL[i];
        table[source as usize] = Some(match source {
            IrqSource::SampleComplete => IrqAction::SampleComplete,
            _ => IrqAction::Ignore,
        });
        i += 1;
    }
    table
}

/// Action per source position; `None` where no source is defined
static IRQ_TABLE: [Option<IrqAction>; TABLE_LEN] = build_table();

/// Action mapped to source position `pos`
pub fn action_for(pos: u32) -> Option<IrqAction> {
    IRQ_TABLE.get(pos as usize).copied().flatten()
}

/// Sources with an action
pub fn mapped_sources() -> impl Iterator<Item = IrqSource> {
    IrqSource::ALL
        .into_iter()
        .filter(|source| action_for(source.pos()).is_some())
}

/// Let every mapped source raise the interrupt line
pub fn unmask_mapped(mgi: &Mgi) {
    for source in mapped_sources() {
        mgi.unmask_source(source);
    }
}

/// Stop every mapped source from raising the interrupt line
pub fn mask_mapped(mgi: &Mgi) {
    for source in mapped_sources() {
        mgi.mask_source(source);
    }
}

/// Scan IRQ_STAT once, running `on_action` for each asserted source and
/// clearing its bit afterwards
///
/// Returns the number of asserted bits that were cleared.
pub fn service<F>(mgi: &Mgi, mut on_action: F) -> FwkResult<u32>
where
    F: FnMut(IrqAction),
{
    let status = mgi.irq_status();
    let mut serviced = 0;

    for pos in 0..IrqSource::MAX {
        if status & (1 << pos) == 0 {
            continue;
        }

        match action_for(pos) {
            Some(IrqAction::SampleComplete) => on_action(IrqAction::SampleComplete),
            Some(IrqAction::Ignore) => {
                log::trace!("[SMCF] Unhandled interrupt source {}", pos);
                on_action(IrqAction::Ignore);
            },
            None => log::trace!("[SMCF] Interrupt bit {} has no source", pos),
        }

        mgi.clear_source_pos(pos)?;
        serviced += 1;
    }

    Ok(serviced)
}

#[cfg(test)]
mod tests {
    use super::*;
    use scp_hal::mgi::regs::*;

    #[test]
    fn test_table_covers_named_sources() {
        assert_eq!(action_for(0), Some(IrqAction::SampleComplete));
        for source in IrqSource::ALL.into_iter().skip(1) {
            assert_eq!(action_for(source.pos()), Some(IrqAction::Ignore));
        }
        for pos in 9..16 {
            assert_eq!(action_for(pos), None);
        }
        assert_eq!(action_for(IrqSource::MAX), None);
        assert_eq!(mapped_sources().count(), IrqSource::ALL.len());
    }

    #[test]
    fn test_service_clears_every_asserted_bit() {
        let mut mem = vec![0u32; MGI_BLOCK_WORDS];
        // Sample complete, error, an unnamed position and an alert
        let asserted = IrqSource::SampleComplete.mask()
            | IrqSource::Error.mask()
            | (1 << 12)
            | IrqSource::Alert3.mask();
        mem[word(IRQ_STAT)] = asserted;
        let mgi = unsafe { Mgi::new(mem.as_mut_ptr() as usize) }.unwrap();

        let mut actions = Vec::new();
        let serviced = service(&mgi, |action| actions.push(action)).unwrap();

        assert_eq!(serviced, 4);
        assert_eq!(
            actions,
            [IrqAction::SampleComplete, IrqAction::Ignore, IrqAction::Ignore]
        );
        assert_eq!(mgi.irq_status(), 0);
    }

    #[test]
    fn test_unmask_mapped() {
        let mut mem = vec![0u32; MGI_BLOCK_WORDS];
        mem[word(IRQ_MASK)] = u32::MAX;
        let mgi = unsafe { Mgi::new(mem.as_mut_ptr() as usize) }.unwrap();

        unmask_mapped(&mgi);
        for source in IrqSource::ALL {
            assert!(!mgi.is_source_masked(source));
        }
        // Unnamed positions keep their mask
        assert_eq!(mgi.block().read(word(IRQ_MASK)).unwrap() & (1 << 12), 1 << 12);

        mask_mapped(&mgi);
        assert_eq!(mgi.block().read(word(IRQ_MASK)).unwrap(), u32::MAX);
    }

    #[test]
    fn test_unnamed_bits_are_acknowledged_without_action() {
        let mut mem = vec![0u32; MGI_BLOCK_WORDS];
        mem[word(IRQ_STAT)] = (1 << 9) | (1 << 15);
        let mgi = unsafe { Mgi::new(mem.as_mut_ptr() as usize) }.unwrap();

        let mut actions = Vec::new();
        assert_eq!(service(&mgi, |action| actions.push(action)), Ok(2));
        assert!(actions.is_empty());
        assert_eq!(mgi.irq_status(), 0);
    }
}
