//! Property-based tests for reference resolution and ap-tracking correction

use hinter::{
    ApCellRef, ApTracking, BinaryOp, Context, Deref, DoubleDeref, Error, Felt, FpCellRef,
    Immediate, MemoryAddress, MemoryValue, Operator, Reference, VirtualMachine, EXECUTION_SEGMENT,
};
use proptest::prelude::*;

// =============================================================================
// STRATEGY GENERATORS
// =============================================================================

fn vm_with(ap: u64, fp: u64) -> VirtualMachine {
    VirtualMachine::new(Context {
        ap,
        fp,
        pc: MemoryAddress::new(0, 0),
    })
}

fn ap_tracking() -> impl Strategy<Value = ApTracking> {
    (0usize..4, 0usize..1000).prop_map(|(group, offset)| ApTracking::new(group, offset))
}

/// Reference trees up to a few levels deep
fn reference_tree() -> impl Strategy<Value = Reference> {
    let leaf = prop_oneof![
        any::<i16>().prop_map(|o| Reference::from(ApCellRef(o))),
        any::<i16>().prop_map(|o| Reference::from(FpCellRef(o))),
        any::<u64>().prop_map(|v| Reference::from(Immediate(Felt::from(v)))),
    ];
    leaf.prop_recursive(4, 32, 2, |inner| {
        prop_oneof![
            inner.clone().prop_map(|r| Reference::from(Deref::new(r))),
            (inner.clone(), any::<i16>())
                .prop_map(|(r, o)| Reference::from(DoubleDeref::new(Deref::new(r), o))),
            (inner.clone(), inner).prop_map(|(l, r)| Reference::from(BinaryOp::new(
                Operator::Add,
                l,
                r
            ))),
        ]
    })
}

/// Collect the `ap`-relative offsets of a tree, left to right
fn ap_offsets(reference: &Reference, out: &mut Vec<i16>) {
    match reference {
        Reference::ApCell(cell) => out.push(cell.0),
        Reference::FpCell(_) | Reference::Immediate(_) => {}
        Reference::Deref(deref) => ap_offsets(deref.inner(), out),
        Reference::DoubleDeref(dderef) => ap_offsets(dderef.deref.inner(), out),
        Reference::BinaryOp(bop) => {
            ap_offsets(&bop.lhs, out);
            ap_offsets(&bop.rhs, out);
        }
    }
}

// =============================================================================
// PROPERTIES
// =============================================================================

proptest! {
    #[test]
    fn cell_address_never_wraps(ap in any::<u64>(), fp in any::<u64>(), offset in any::<i16>()) {
        let vm = vm_with(ap, fp);

        let expected = ap.checked_add_signed(i64::from(offset));
        match ApCellRef(offset).get_address(&vm) {
            Ok(addr) => {
                prop_assert_eq!(Some(addr.offset), expected);
                prop_assert_eq!(addr.segment_index, EXECUTION_SEGMENT);
            }
            Err(err) => {
                prop_assert!(expected.is_none());
                let is_overflow = matches!(err, Error::OffsetOverflow { .. });
                prop_assert!(is_overflow);
            }
        }

        let expected = fp.checked_add_signed(i64::from(offset));
        prop_assert_eq!(FpCellRef(offset).get_address(&vm).ok().map(|a| a.offset), expected);
    }

    #[test]
    fn ap_tracking_group_mismatch_is_identity(
        offset in any::<i16>(),
        recorded in ap_tracking(),
        current in ap_tracking(),
    ) {
        prop_assume!(recorded.group != current.group);
        prop_assert_eq!(ApCellRef(offset).apply_ap_tracking(recorded, current), ApCellRef(offset));
    }

    #[test]
    fn ap_tracking_same_group_shifts(
        offset in -1000i16..1000,
        group in 0usize..4,
        recorded_offset in 0usize..1000,
        current_offset in 0usize..1000,
    ) {
        let recorded = ApTracking::new(group, recorded_offset);
        let current = ApTracking::new(group, current_offset);
        let expected = offset as i64 - (recorded_offset as i64 - current_offset as i64);

        let corrected = ApCellRef(offset).apply_ap_tracking(recorded, current);
        prop_assert_eq!(corrected.0 as i64, expected);
    }

    #[test]
    fn fp_cells_ignore_ap_tracking(
        offset in any::<i16>(),
        recorded in ap_tracking(),
        current in ap_tracking(),
    ) {
        prop_assert_eq!(FpCellRef(offset).apply_ap_tracking(recorded, current), FpCellRef(offset));
    }

    #[test]
    fn ap_tracking_shifts_every_ap_leaf_uniformly(
        tree in reference_tree(),
        group in 0usize..4,
        recorded_offset in 0usize..100,
        current_offset in 0usize..100,
    ) {
        let recorded = ApTracking::new(group, recorded_offset);
        let current = ApTracking::new(group, current_offset);
        let delta = (recorded_offset as i64 - current_offset as i64) as i16;

        let corrected = tree.apply_ap_tracking(recorded, current);

        let mut before = Vec::new();
        let mut after = Vec::new();
        ap_offsets(&tree, &mut before);
        ap_offsets(&corrected, &mut after);

        let shifted: Vec<i16> = before.iter().map(|o| o.wrapping_sub(delta)).collect();
        prop_assert_eq!(after, shifted);
    }

    #[test]
    fn immediate_resolves_to_itself(value in any::<u64>(), ap in any::<u64>(), fp in any::<u64>()) {
        let vm = vm_with(ap, fp);
        let imm = Reference::from(Immediate(Felt::from(value)));

        prop_assert_eq!(imm.resolve(&vm).unwrap(), MemoryValue::Felt(Felt::from(value)));
        let not_addressable = matches!(imm.get_address(&vm), Err(Error::NotAddressable { .. }));
        prop_assert!(not_addressable);
    }

    #[test]
    fn add_pointer_and_felt_offsets_pointer(
        segment in 0u64..8,
        base in 0u64..1_000_000,
        delta in 0u64..1_000_000,
        pointer_first in any::<bool>(),
    ) {
        let mut vm = vm_with(5, 5);
        vm.write_execution_cell(5, MemoryAddress::new(segment, base)).unwrap();

        let pointer = Deref::new(FpCellRef(0));
        let offset = Immediate(Felt::from(delta));
        let bop = if pointer_first {
            BinaryOp::new(Operator::Add, pointer, offset)
        } else {
            BinaryOp::new(Operator::Add, offset, pointer)
        };

        prop_assert_eq!(
            bop.resolve(&vm).unwrap(),
            MemoryValue::Address(MemoryAddress::new(segment, base + delta))
        );
    }

    #[test]
    fn add_and_mul_of_felts_stay_felts(a in any::<u64>(), b in any::<u64>()) {
        let vm = VirtualMachine::default();
        let lhs = Immediate(Felt::from(a));
        let rhs = Immediate(Felt::from(b));

        let sum = BinaryOp::new(Operator::Add, lhs, rhs).resolve(&vm).unwrap();
        prop_assert_eq!(sum, MemoryValue::Felt(Felt::from(a) + Felt::from(b)));

        let product = BinaryOp::new(Operator::Mul, lhs, rhs).resolve(&vm).unwrap();
        prop_assert_eq!(product, MemoryValue::Felt(Felt::from(a) * Felt::from(b)));
    }

    #[test]
    fn deref_reads_back_written_cell(fp in 0u64..10_000, offset in -100i16..100, value in any::<u64>()) {
        prop_assume!(fp as i64 + offset as i64 >= 0);
        let mut vm = vm_with(0, fp);
        let cell = (fp as i64 + offset as i64) as u64;
        vm.write_execution_cell(cell, Felt::from(value)).unwrap();

        let deref = Reference::from(Deref::new(FpCellRef(offset)));
        prop_assert_eq!(deref.resolve(&vm).unwrap(), MemoryValue::Felt(Felt::from(value)));
    }
}
