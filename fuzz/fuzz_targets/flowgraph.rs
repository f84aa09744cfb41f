#![no_main]

use libfuzzer_sys::fuzz_target;
use tacflow::{BinaryOp, FlowGraph, Function, Label, Tac, Temp, UnaryOp};

// Small operand spaces so branches hit placed labels and temps get reused.
const TEMPS: u8 = 16;
const LABELS: u8 = 8;

fn temp(b: u8) -> Temp {
    Temp::new(u32::from(b % TEMPS))
}

fn label(b: u8) -> Label {
    Label::new(u32::from(b % LABELS))
}

fn decode(data: &[u8]) -> Vec<Tac> {
    data.chunks_exact(3)
        .map(|op| {
            let (a, b) = (op[1], op[2]);
            match op[0] % 12 {
                0 => Tac::Binary {
                    op: BinaryOp::Add,
                    dest: temp(a),
                    left: temp(b),
                    right: temp(b >> 4),
                },
                1 => Tac::Unary {
                    op: UnaryOp::Assign,
                    dest: temp(a),
                    src: temp(b),
                },
                2 => Tac::LoadImm4 {
                    dest: temp(a),
                    value: i32::from(b),
                },
                3 => Tac::Load {
                    dest: temp(a),
                    base: temp(b),
                    offset: 4,
                },
                4 => Tac::Store {
                    src: temp(a),
                    base: temp(b),
                    offset: 4,
                },
                5 => Tac::Parm { value: temp(a) },
                6 => Tac::IndirectCall {
                    dest: (b & 1 == 0).then(|| temp(a)),
                    target: temp(b),
                },
                7 => Tac::Branch { target: label(a) },
                8 => Tac::Beqz {
                    cond: temp(a),
                    target: label(b),
                },
                9 => Tac::Bnez {
                    cond: temp(a),
                    target: label(b),
                },
                10 => Tac::Return {
                    value: (b & 1 == 0).then(|| temp(a)),
                },
                _ => Tac::Mark { label: label(a) },
            }
        })
        .collect()
}

fuzz_target!(|data: &[u8]| {
    let function = Function::new("fuzz", decode(data));
    if let Ok(graph) = FlowGraph::new(function) {
        assert!(graph.verify_liveness());
    }
});
