use criterion::{black_box, criterion_group, criterion_main, Criterion};
use hinter::{
    ApCellRef, ApTracking, BinaryOp, Context, Deref, DoubleDeref, Felt, FpCellRef, Immediate,
    MemoryAddress, Operator, Reference, VirtualMachine,
};

fn resolve_benchmark(c: &mut Criterion) {
    let mut vm = VirtualMachine::new(Context {
        ap: 20,
        fp: 10,
        pc: MemoryAddress::new(0, 0),
    });
    let heap = vm.memory.allocate_segment();
    vm.write_execution_cell(10, Felt::from(3u64)).unwrap();
    vm.write_execution_cell(11, MemoryAddress::new(heap, 0))
        .unwrap();
    vm.write_execution_cell(19, Felt::from(4u64)).unwrap();
    vm.memory
        .write_to_address(&MemoryAddress::new(heap, 2), Felt::from(5u64).into())
        .unwrap();

    // [fp] * [ap - 1] + [[fp + 1] + 2] + 1
    let reference: Reference = BinaryOp::new(
        Operator::Add,
        BinaryOp::new(Operator::Mul, Deref::new(FpCellRef(0)), Deref::new(ApCellRef(-1))),
        BinaryOp::new(
            Operator::Add,
            DoubleDeref::new(Deref::new(FpCellRef(1)), 2),
            Immediate(Felt::from(1u64)),
        ),
    )
    .into();

    c.bench_function("resolve nested reference", |b| {
        b.iter(|| black_box(&reference).resolve(black_box(&vm)).unwrap())
    });

    c.bench_function("apply ap tracking", |b| {
        let recorded = ApTracking::new(1, 6);
        let current = ApTracking::new(1, 2);
        b.iter(|| black_box(&reference).apply_ap_tracking(recorded, current))
    });
}

criterion_group!(benches, resolve_benchmark);
criterion_main!(benches);
