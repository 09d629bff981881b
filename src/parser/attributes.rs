//! Static instruction attributes.
//!
//! One table, built once on first use, maps every [`Opcode`] to its
//! mnemonic, the shape of the immediates that follow it on the wire, its
//! operand signature and, for memory and vector instructions, the access
//! width and lane shape. The reader uses it to decode immediates, the writer
//! to encode them, and the validator for the type contract.

use crate::parser::opcodes::*;
use crate::parser::types::ValueType;
use crate::parser::types::ValueType::{FuncRef, F32, F64, I32, I64, V128};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// The immediate operands that follow an opcode, which is also the visitor
/// method an instruction is delivered through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Immediates {
    /// Nothing follows, apart from any reserved zero bytes.
    Insn,
    /// A constant of the instruction's type.
    Const,
    /// A reference type.
    RefNull,
    /// A function index.
    RefFunc,
    /// A vector of value types.
    SelectTyped,
    /// A local or global index.
    Variable,
    /// A table index, or an element segment index for `elem.drop`.
    Table,
    /// Two indices: element and table for `table.init`, destination and
    /// source tables for `table.copy`.
    TablePair,
    /// Alignment and offset.
    Mem,
    /// Alignment, offset and a lane index.
    MemLane,
    /// A data segment index.
    IndexedMem,
    /// A block type.
    Block,
    Else,
    End,
    /// A label index.
    Break,
    /// A vector of label indices and a default label.
    BrTable,
    /// A function index.
    Call,
    /// A type index and a table index.
    CallIndirect,
    /// A lane index byte.
    Lane,
    /// Sixteen lane index bytes.
    Shuffle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VectorShape {
    I8x16,
    I16x8,
    I32x4,
    I64x2,
    F32x4,
    F64x2,
}

impl VectorShape {
    pub fn lanes(&self) -> u8 {
        match self {
            VectorShape::I8x16 => 16,
            VectorShape::I16x8 => 8,
            VectorShape::I32x4 | VectorShape::F32x4 => 4,
            VectorShape::I64x2 | VectorShape::F64x2 => 2,
        }
    }

    /// The scalar type a lane is extracted to or replaced from.
    pub fn lane_type(&self) -> ValueType {
        match self {
            VectorShape::I8x16 | VectorShape::I16x8 | VectorShape::I32x4 => I32,
            VectorShape::I64x2 => I64,
            VectorShape::F32x4 => F32,
            VectorShape::F64x2 => F64,
        }
    }

    fn from_mnemonic(mnemonic: &str) -> Option<VectorShape> {
        let prefix = mnemonic.split('.').next()?;
        match prefix {
            "i8x16" => Some(VectorShape::I8x16),
            "i16x8" => Some(VectorShape::I16x8),
            "i32x4" => Some(VectorShape::I32x4),
            "i64x2" => Some(VectorShape::I64x2),
            "f32x4" => Some(VectorShape::F32x4),
            "f64x2" => Some(VectorShape::F64x2),
            _ => None,
        }
    }
}

/// Values popped (in stack order, deepest first) and pushed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackType {
    pub pops: Vec<ValueType>,
    pub pushes: Vec<ValueType>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsnAttributes {
    pub opcode: Opcode,
    pub mnemonic: &'static str,
    pub immediates: Immediates,
    /// `None` when the effect depends on immediates or context, in which case
    /// the validator handles the instruction itself.
    pub stack: Option<StackType>,
    pub shape: Option<VectorShape>,
    /// Width of the memory access in bits.
    pub mem_bits: Option<u32>,
    /// Zero bytes that follow the immediates.
    pub reserved: u8,
}

impl InsnAttributes {
    /// Largest alignment exponent the access permits.
    pub fn natural_alignment(&self) -> Option<u32> {
        self.mem_bits.map(|bits| (bits / 8).trailing_zeros())
    }

    fn mem(&mut self, bits: u32) -> &mut Self {
        self.mem_bits = Some(bits);
        self
    }

    fn reserved(&mut self, count: u8) -> &mut Self {
        self.reserved = count;
        self
    }

    fn lanes(&mut self, shape: VectorShape) -> &mut Self {
        self.shape = Some(shape);
        self
    }
}

pub fn lookup(opcode: Opcode) -> Option<&'static InsnAttributes> {
    ATTRIBUTES.get(&opcode)
}

pub fn lookup_mnemonic(mnemonic: &str) -> Option<&'static InsnAttributes> {
    MNEMONICS.get(mnemonic).and_then(|opcode| lookup(*opcode))
}

/// Every known opcode in ascending order.
pub fn all_opcodes() -> Vec<Opcode> {
    let mut opcodes: Vec<Opcode> = ATTRIBUTES.keys().copied().collect();
    opcodes.sort();
    opcodes
}

static ATTRIBUTES: Lazy<HashMap<Opcode, InsnAttributes>> = Lazy::new(build);

// `select` has an untyped and a typed encoding; the mnemonic maps to the first.
static MNEMONICS: Lazy<HashMap<&'static str, Opcode>> = Lazy::new(|| {
    let mut map = HashMap::new();
    for opcode in all_opcodes() {
        if let Some(attrs) = lookup(opcode) {
            map.entry(attrs.mnemonic).or_insert(opcode);
        }
    }
    map
});

// ---------------------------------------------------------------------------
// Table construction
// ---------------------------------------------------------------------------

#[derive(Default)]
struct Builder {
    entries: HashMap<Opcode, InsnAttributes>,
}

impl Builder {
    fn add(
        &mut self,
        opcode: Opcode,
        mnemonic: &'static str,
        immediates: Immediates,
        stack: Option<StackType>,
    ) -> &mut InsnAttributes {
        let shape = match opcode {
            Opcode::Vector(_) => VectorShape::from_mnemonic(mnemonic),
            _ => None,
        };
        self.entries.entry(opcode).or_insert(InsnAttributes {
            opcode,
            mnemonic,
            immediates,
            stack,
            shape,
            mem_bits: None,
            reserved: 0,
        })
    }

    fn group(&mut self, ops: &[(Opcode, &'static str)], stack: Option<StackType>) {
        for (opcode, mnemonic) in ops {
            self.add(*opcode, mnemonic, Immediates::Insn, stack.clone());
        }
    }
}

fn sig(pops: &[ValueType], pushes: &[ValueType]) -> Option<StackType> {
    Some(StackType {
        pops: pops.to_vec(),
        pushes: pushes.to_vec(),
    })
}

fn un(t: ValueType) -> Option<StackType> {
    sig(&[t], &[t])
}

fn bin(t: ValueType) -> Option<StackType> {
    sig(&[t, t], &[t])
}

fn test_op(t: ValueType) -> Option<StackType> {
    sig(&[t], &[I32])
}

fn rel(t: ValueType) -> Option<StackType> {
    sig(&[t, t], &[I32])
}

fn cvt(to: ValueType, from: ValueType) -> Option<StackType> {
    sig(&[from], &[to])
}

fn build() -> HashMap<Opcode, InsnAttributes> {
    use Immediates::*;

    let mut t = Builder::default();

    // control
    t.add(UNREACHABLE, "unreachable", Insn, None);
    t.add(NOP, "nop", Insn, sig(&[], &[]));
    t.add(BLOCK, "block", Block, None);
    t.add(LOOP, "loop", Block, None);
    t.add(IF, "if", Block, None);
    t.add(ELSE, "else", Else, None);
    t.add(END, "end", End, None);
    t.add(BR, "br", Break, None);
    t.add(BR_IF, "br_if", Break, None);
    t.add(BR_TABLE, "br_table", BrTable, None);
    t.add(RETURN, "return", Insn, None);
    t.add(CALL, "call", Call, None);
    t.add(CALL_INDIRECT, "call_indirect", CallIndirect, None);

    // reference
    t.add(REF_NULL, "ref.null", RefNull, None);
    t.add(REF_IS_NULL, "ref.is_null", Insn, None);
    t.add(REF_FUNC, "ref.func", RefFunc, sig(&[], &[FuncRef]));

    // parametric
    t.add(DROP, "drop", Insn, None);
    t.add(SELECT, "select", Insn, None);
    t.add(SELECT_TYPED, "select", SelectTyped, None);

    // variable
    t.add(LOCAL_GET, "local.get", Variable, None);
    t.add(LOCAL_SET, "local.set", Variable, None);
    t.add(LOCAL_TEE, "local.tee", Variable, None);
    t.add(GLOBAL_GET, "global.get", Variable, None);
    t.add(GLOBAL_SET, "global.set", Variable, None);

    // table
    t.add(TABLE_GET, "table.get", Table, None);
    t.add(TABLE_SET, "table.set", Table, None);
    t.add(TABLE_INIT, "table.init", TablePair, sig(&[I32, I32, I32], &[]));
    t.add(ELEM_DROP, "elem.drop", Table, sig(&[], &[]));
    t.add(TABLE_COPY, "table.copy", TablePair, sig(&[I32, I32, I32], &[]));
    t.add(TABLE_GROW, "table.grow", Table, None);
    t.add(TABLE_SIZE, "table.size", Table, sig(&[], &[I32]));
    t.add(TABLE_FILL, "table.fill", Table, None);

    // memory
    t.add(I32_LOAD, "i32.load", Mem, cvt(I32, I32)).mem(32);
    t.add(I64_LOAD, "i64.load", Mem, cvt(I64, I32)).mem(64);
    t.add(F32_LOAD, "f32.load", Mem, cvt(F32, I32)).mem(32);
    t.add(F64_LOAD, "f64.load", Mem, cvt(F64, I32)).mem(64);
    t.add(I32_LOAD8_S, "i32.load8_s", Mem, cvt(I32, I32)).mem(8);
    t.add(I32_LOAD8_U, "i32.load8_u", Mem, cvt(I32, I32)).mem(8);
    t.add(I32_LOAD16_S, "i32.load16_s", Mem, cvt(I32, I32)).mem(16);
    t.add(I32_LOAD16_U, "i32.load16_u", Mem, cvt(I32, I32)).mem(16);
    t.add(I64_LOAD8_S, "i64.load8_s", Mem, cvt(I64, I32)).mem(8);
    t.add(I64_LOAD8_U, "i64.load8_u", Mem, cvt(I64, I32)).mem(8);
    t.add(I64_LOAD16_S, "i64.load16_s", Mem, cvt(I64, I32)).mem(16);
    t.add(I64_LOAD16_U, "i64.load16_u", Mem, cvt(I64, I32)).mem(16);
    t.add(I64_LOAD32_S, "i64.load32_s", Mem, cvt(I64, I32)).mem(32);
    t.add(I64_LOAD32_U, "i64.load32_u", Mem, cvt(I64, I32)).mem(32);
    t.add(I32_STORE, "i32.store", Mem, sig(&[I32, I32], &[])).mem(32);
    t.add(I64_STORE, "i64.store", Mem, sig(&[I32, I64], &[])).mem(64);
    t.add(F32_STORE, "f32.store", Mem, sig(&[I32, F32], &[])).mem(32);
    t.add(F64_STORE, "f64.store", Mem, sig(&[I32, F64], &[])).mem(64);
    t.add(I32_STORE8, "i32.store8", Mem, sig(&[I32, I32], &[])).mem(8);
    t.add(I32_STORE16, "i32.store16", Mem, sig(&[I32, I32], &[])).mem(16);
    t.add(I64_STORE8, "i64.store8", Mem, sig(&[I32, I64], &[])).mem(8);
    t.add(I64_STORE16, "i64.store16", Mem, sig(&[I32, I64], &[])).mem(16);
    t.add(I64_STORE32, "i64.store32", Mem, sig(&[I32, I64], &[])).mem(32);
    t.add(MEMORY_SIZE, "memory.size", Insn, sig(&[], &[I32])).reserved(1);
    t.add(MEMORY_GROW, "memory.grow", Insn, un(I32)).reserved(1);
    t.add(MEMORY_INIT, "memory.init", IndexedMem, sig(&[I32, I32, I32], &[])).reserved(1);
    t.add(DATA_DROP, "data.drop", IndexedMem, sig(&[], &[]));
    t.add(MEMORY_COPY, "memory.copy", Insn, sig(&[I32, I32, I32], &[])).reserved(2);
    t.add(MEMORY_FILL, "memory.fill", Insn, sig(&[I32, I32, I32], &[])).reserved(1);

    // constants
    t.add(I32_CONST, "i32.const", Const, sig(&[], &[I32]));
    t.add(I64_CONST, "i64.const", Const, sig(&[], &[I64]));
    t.add(F32_CONST, "f32.const", Const, sig(&[], &[F32]));
    t.add(F64_CONST, "f64.const", Const, sig(&[], &[F64]));

    // numeric
    t.group(&[(I32_EQZ, "i32.eqz")], test_op(I32));
    t.group(
        &[
            (I32_EQ, "i32.eq"),
            (I32_NE, "i32.ne"),
            (I32_LT_S, "i32.lt_s"),
            (I32_LT_U, "i32.lt_u"),
            (I32_GT_S, "i32.gt_s"),
            (I32_GT_U, "i32.gt_u"),
            (I32_LE_S, "i32.le_s"),
            (I32_LE_U, "i32.le_u"),
            (I32_GE_S, "i32.ge_s"),
            (I32_GE_U, "i32.ge_u"),
        ],
        rel(I32),
    );
    t.group(&[(I64_EQZ, "i64.eqz")], test_op(I64));
    t.group(
        &[
            (I64_EQ, "i64.eq"),
            (I64_NE, "i64.ne"),
            (I64_LT_S, "i64.lt_s"),
            (I64_LT_U, "i64.lt_u"),
            (I64_GT_S, "i64.gt_s"),
            (I64_GT_U, "i64.gt_u"),
            (I64_LE_S, "i64.le_s"),
            (I64_LE_U, "i64.le_u"),
            (I64_GE_S, "i64.ge_s"),
            (I64_GE_U, "i64.ge_u"),
        ],
        rel(I64),
    );
    t.group(
        &[
            (F32_EQ, "f32.eq"),
            (F32_NE, "f32.ne"),
            (F32_LT, "f32.lt"),
            (F32_GT, "f32.gt"),
            (F32_LE, "f32.le"),
            (F32_GE, "f32.ge"),
        ],
        rel(F32),
    );
    t.group(
        &[
            (F64_EQ, "f64.eq"),
            (F64_NE, "f64.ne"),
            (F64_LT, "f64.lt"),
            (F64_GT, "f64.gt"),
            (F64_LE, "f64.le"),
            (F64_GE, "f64.ge"),
        ],
        rel(F64),
    );
    t.group(
        &[
            (I32_CLZ, "i32.clz"),
            (I32_CTZ, "i32.ctz"),
            (I32_POPCNT, "i32.popcnt"),
            (I32_EXTEND8_S, "i32.extend8_s"),
            (I32_EXTEND16_S, "i32.extend16_s"),
        ],
        un(I32),
    );
    t.group(
        &[
            (I32_ADD, "i32.add"),
            (I32_SUB, "i32.sub"),
            (I32_MUL, "i32.mul"),
            (I32_DIV_S, "i32.div_s"),
            (I32_DIV_U, "i32.div_u"),
            (I32_REM_S, "i32.rem_s"),
            (I32_REM_U, "i32.rem_u"),
            (I32_AND, "i32.and"),
            (I32_OR, "i32.or"),
            (I32_XOR, "i32.xor"),
            (I32_SHL, "i32.shl"),
            (I32_SHR_S, "i32.shr_s"),
            (I32_SHR_U, "i32.shr_u"),
            (I32_ROTL, "i32.rotl"),
            (I32_ROTR, "i32.rotr"),
        ],
        bin(I32),
    );
    t.group(
        &[
            (I64_CLZ, "i64.clz"),
            (I64_CTZ, "i64.ctz"),
            (I64_POPCNT, "i64.popcnt"),
            (I64_EXTEND8_S, "i64.extend8_s"),
            (I64_EXTEND16_S, "i64.extend16_s"),
            (I64_EXTEND32_S, "i64.extend32_s"),
        ],
        un(I64),
    );
    t.group(
        &[
            (I64_ADD, "i64.add"),
            (I64_SUB, "i64.sub"),
            (I64_MUL, "i64.mul"),
            (I64_DIV_S, "i64.div_s"),
            (I64_DIV_U, "i64.div_u"),
            (I64_REM_S, "i64.rem_s"),
            (I64_REM_U, "i64.rem_u"),
            (I64_AND, "i64.and"),
            (I64_OR, "i64.or"),
            (I64_XOR, "i64.xor"),
            (I64_SHL, "i64.shl"),
            (I64_SHR_S, "i64.shr_s"),
            (I64_SHR_U, "i64.shr_u"),
            (I64_ROTL, "i64.rotl"),
            (I64_ROTR, "i64.rotr"),
        ],
        bin(I64),
    );
    t.group(
        &[
            (F32_ABS, "f32.abs"),
            (F32_NEG, "f32.neg"),
            (F32_CEIL, "f32.ceil"),
            (F32_FLOOR, "f32.floor"),
            (F32_TRUNC, "f32.trunc"),
            (F32_NEAREST, "f32.nearest"),
            (F32_SQRT, "f32.sqrt"),
        ],
        un(F32),
    );
    t.group(
        &[
            (F32_ADD, "f32.add"),
            (F32_SUB, "f32.sub"),
            (F32_MUL, "f32.mul"),
            (F32_DIV, "f32.div"),
            (F32_MIN, "f32.min"),
            (F32_MAX, "f32.max"),
            (F32_COPYSIGN, "f32.copysign"),
        ],
        bin(F32),
    );
    t.group(
        &[
            (F64_ABS, "f64.abs"),
            (F64_NEG, "f64.neg"),
            (F64_CEIL, "f64.ceil"),
            (F64_FLOOR, "f64.floor"),
            (F64_TRUNC, "f64.trunc"),
            (F64_NEAREST, "f64.nearest"),
            (F64_SQRT, "f64.sqrt"),
        ],
        un(F64),
    );
    t.group(
        &[
            (F64_ADD, "f64.add"),
            (F64_SUB, "f64.sub"),
            (F64_MUL, "f64.mul"),
            (F64_DIV, "f64.div"),
            (F64_MIN, "f64.min"),
            (F64_MAX, "f64.max"),
            (F64_COPYSIGN, "f64.copysign"),
        ],
        bin(F64),
    );

    // conversions
    t.group(&[(I32_WRAP_I64, "i32.wrap_i64")], cvt(I32, I64));
    t.group(
        &[
            (I32_TRUNC_F32_S, "i32.trunc_f32_s"),
            (I32_TRUNC_F32_U, "i32.trunc_f32_u"),
            (I32_REINTERPRET_F32, "i32.reinterpret_f32"),
        ],
        cvt(I32, F32),
    );
    t.group(
        &[(I32_TRUNC_F64_S, "i32.trunc_f64_s"), (I32_TRUNC_F64_U, "i32.trunc_f64_u")],
        cvt(I32, F64),
    );
    t.group(
        &[(I64_EXTEND_I32_S, "i64.extend_i32_s"), (I64_EXTEND_I32_U, "i64.extend_i32_u")],
        cvt(I64, I32),
    );
    t.group(
        &[(I64_TRUNC_F32_S, "i64.trunc_f32_s"), (I64_TRUNC_F32_U, "i64.trunc_f32_u")],
        cvt(I64, F32),
    );
    t.group(
        &[
            (I64_TRUNC_F64_S, "i64.trunc_f64_s"),
            (I64_TRUNC_F64_U, "i64.trunc_f64_u"),
            (I64_REINTERPRET_F64, "i64.reinterpret_f64"),
        ],
        cvt(I64, F64),
    );
    t.group(
        &[
            (F32_CONVERT_I32_S, "f32.convert_i32_s"),
            (F32_CONVERT_I32_U, "f32.convert_i32_u"),
            (F32_REINTERPRET_I32, "f32.reinterpret_i32"),
        ],
        cvt(F32, I32),
    );
    t.group(
        &[(F32_CONVERT_I64_S, "f32.convert_i64_s"), (F32_CONVERT_I64_U, "f32.convert_i64_u")],
        cvt(F32, I64),
    );
    t.group(&[(F32_DEMOTE_F64, "f32.demote_f64")], cvt(F32, F64));
    t.group(
        &[(F64_CONVERT_I32_S, "f64.convert_i32_s"), (F64_CONVERT_I32_U, "f64.convert_i32_u")],
        cvt(F64, I32),
    );
    t.group(
        &[
            (F64_CONVERT_I64_S, "f64.convert_i64_s"),
            (F64_CONVERT_I64_U, "f64.convert_i64_u"),
            (F64_REINTERPRET_I64, "f64.reinterpret_i64"),
        ],
        cvt(F64, I64),
    );
    t.group(&[(F64_PROMOTE_F32, "f64.promote_f32")], cvt(F64, F32));

    // saturating truncation
    t.group(
        &[(I32_TRUNC_SAT_F32_S, "i32.trunc_sat_f32_s"), (I32_TRUNC_SAT_F32_U, "i32.trunc_sat_f32_u")],
        cvt(I32, F32),
    );
    t.group(
        &[(I32_TRUNC_SAT_F64_S, "i32.trunc_sat_f64_s"), (I32_TRUNC_SAT_F64_U, "i32.trunc_sat_f64_u")],
        cvt(I32, F64),
    );
    t.group(
        &[(I64_TRUNC_SAT_F32_S, "i64.trunc_sat_f32_s"), (I64_TRUNC_SAT_F32_U, "i64.trunc_sat_f32_u")],
        cvt(I64, F32),
    );
    t.group(
        &[(I64_TRUNC_SAT_F64_S, "i64.trunc_sat_f64_s"), (I64_TRUNC_SAT_F64_U, "i64.trunc_sat_f64_u")],
        cvt(I64, F64),
    );

    build_vector(&mut t);

    t.entries
}

fn build_vector(t: &mut Builder) {
    use Immediates::*;

    // memory
    let load = sig(&[I32], &[V128]);
    t.add(V128_LOAD, "v128.load", Mem, load.clone()).mem(128);
    t.add(V128_LOAD8X8_S, "v128.load8x8_s", Mem, load.clone()).mem(64);
    t.add(V128_LOAD8X8_U, "v128.load8x8_u", Mem, load.clone()).mem(64);
    t.add(V128_LOAD16X4_S, "v128.load16x4_s", Mem, load.clone()).mem(64);
    t.add(V128_LOAD16X4_U, "v128.load16x4_u", Mem, load.clone()).mem(64);
    t.add(V128_LOAD32X2_S, "v128.load32x2_s", Mem, load.clone()).mem(64);
    t.add(V128_LOAD32X2_U, "v128.load32x2_u", Mem, load.clone()).mem(64);
    t.add(V128_LOAD8_SPLAT, "v128.load8_splat", Mem, load.clone()).mem(8);
    t.add(V128_LOAD16_SPLAT, "v128.load16_splat", Mem, load.clone()).mem(16);
    t.add(V128_LOAD32_SPLAT, "v128.load32_splat", Mem, load.clone()).mem(32);
    t.add(V128_LOAD64_SPLAT, "v128.load64_splat", Mem, load.clone()).mem(64);
    t.add(V128_LOAD32_ZERO, "v128.load32_zero", Mem, load.clone()).mem(32);
    t.add(V128_LOAD64_ZERO, "v128.load64_zero", Mem, load).mem(64);
    t.add(V128_STORE, "v128.store", Mem, sig(&[I32, V128], &[])).mem(128);

    let load_lane = sig(&[I32, V128], &[V128]);
    let store_lane = sig(&[I32, V128], &[]);
    t.add(V128_LOAD8_LANE, "v128.load8_lane", MemLane, load_lane.clone())
        .mem(8)
        .lanes(VectorShape::I8x16);
    t.add(V128_LOAD16_LANE, "v128.load16_lane", MemLane, load_lane.clone())
        .mem(16)
        .lanes(VectorShape::I16x8);
    t.add(V128_LOAD32_LANE, "v128.load32_lane", MemLane, load_lane.clone())
        .mem(32)
        .lanes(VectorShape::I32x4);
    t.add(V128_LOAD64_LANE, "v128.load64_lane", MemLane, load_lane)
        .mem(64)
        .lanes(VectorShape::I64x2);
    t.add(V128_STORE8_LANE, "v128.store8_lane", MemLane, store_lane.clone())
        .mem(8)
        .lanes(VectorShape::I8x16);
    t.add(V128_STORE16_LANE, "v128.store16_lane", MemLane, store_lane.clone())
        .mem(16)
        .lanes(VectorShape::I16x8);
    t.add(V128_STORE32_LANE, "v128.store32_lane", MemLane, store_lane.clone())
        .mem(32)
        .lanes(VectorShape::I32x4);
    t.add(V128_STORE64_LANE, "v128.store64_lane", MemLane, store_lane)
        .mem(64)
        .lanes(VectorShape::I64x2);

    t.add(V128_CONST, "v128.const", Const, sig(&[], &[V128]));
    t.add(I8X16_SHUFFLE, "i8x16.shuffle", Shuffle, bin(V128));

    // splat
    t.group(
        &[(I8X16_SPLAT, "i8x16.splat"), (I16X8_SPLAT, "i16x8.splat"), (I32X4_SPLAT, "i32x4.splat")],
        cvt(V128, I32),
    );
    t.group(&[(I64X2_SPLAT, "i64x2.splat")], cvt(V128, I64));
    t.group(&[(F32X4_SPLAT, "f32x4.splat")], cvt(V128, F32));
    t.group(&[(F64X2_SPLAT, "f64x2.splat")], cvt(V128, F64));

    // lanes
    let lanes: &[(Opcode, &'static str, ValueType)] = &[
        (I8X16_EXTRACT_LANE_S, "i8x16.extract_lane_s", I32),
        (I8X16_EXTRACT_LANE_U, "i8x16.extract_lane_u", I32),
        (I16X8_EXTRACT_LANE_S, "i16x8.extract_lane_s", I32),
        (I16X8_EXTRACT_LANE_U, "i16x8.extract_lane_u", I32),
        (I32X4_EXTRACT_LANE, "i32x4.extract_lane", I32),
        (I64X2_EXTRACT_LANE, "i64x2.extract_lane", I64),
        (F32X4_EXTRACT_LANE, "f32x4.extract_lane", F32),
        (F64X2_EXTRACT_LANE, "f64x2.extract_lane", F64),
    ];
    for (opcode, mnemonic, scalar) in lanes {
        t.add(*opcode, mnemonic, Lane, cvt(*scalar, V128));
    }
    let lanes: &[(Opcode, &'static str, ValueType)] = &[
        (I8X16_REPLACE_LANE, "i8x16.replace_lane", I32),
        (I16X8_REPLACE_LANE, "i16x8.replace_lane", I32),
        (I32X4_REPLACE_LANE, "i32x4.replace_lane", I32),
        (I64X2_REPLACE_LANE, "i64x2.replace_lane", I64),
        (F32X4_REPLACE_LANE, "f32x4.replace_lane", F32),
        (F64X2_REPLACE_LANE, "f64x2.replace_lane", F64),
    ];
    for (opcode, mnemonic, scalar) in lanes {
        t.add(*opcode, mnemonic, Lane, sig(&[V128, *scalar], &[V128]));
    }

    // v128 -> i32
    t.group(
        &[
            (V128_ANY_TRUE, "v128.any_true"),
            (I8X16_ALL_TRUE, "i8x16.all_true"),
            (I8X16_BITMASK, "i8x16.bitmask"),
            (I16X8_ALL_TRUE, "i16x8.all_true"),
            (I16X8_BITMASK, "i16x8.bitmask"),
            (I32X4_ALL_TRUE, "i32x4.all_true"),
            (I32X4_BITMASK, "i32x4.bitmask"),
            (I64X2_ALL_TRUE, "i64x2.all_true"),
            (I64X2_BITMASK, "i64x2.bitmask"),
        ],
        test_op(V128),
    );

    // shifts
    t.group(
        &[
            (I8X16_SHL, "i8x16.shl"),
            (I8X16_SHR_S, "i8x16.shr_s"),
            (I8X16_SHR_U, "i8x16.shr_u"),
            (I16X8_SHL, "i16x8.shl"),
            (I16X8_SHR_S, "i16x8.shr_s"),
            (I16X8_SHR_U, "i16x8.shr_u"),
            (I32X4_SHL, "i32x4.shl"),
            (I32X4_SHR_S, "i32x4.shr_s"),
            (I32X4_SHR_U, "i32x4.shr_u"),
            (I64X2_SHL, "i64x2.shl"),
            (I64X2_SHR_S, "i64x2.shr_s"),
            (I64X2_SHR_U, "i64x2.shr_u"),
        ],
        sig(&[V128, I32], &[V128]),
    );

    t.group(&[(V128_BITSELECT, "v128.bitselect")], sig(&[V128, V128, V128], &[V128]));

    t.group(
        &[
            (V128_NOT, "v128.not"),
            (F32X4_DEMOTE_F64X2_ZERO, "f32x4.demote_f64x2_zero"),
            (F64X2_PROMOTE_LOW_F32X4, "f64x2.promote_low_f32x4"),
            (I8X16_ABS, "i8x16.abs"),
            (I8X16_NEG, "i8x16.neg"),
            (I8X16_POPCNT, "i8x16.popcnt"),
            (F32X4_CEIL, "f32x4.ceil"),
            (F32X4_FLOOR, "f32x4.floor"),
            (F32X4_TRUNC, "f32x4.trunc"),
            (F32X4_NEAREST, "f32x4.nearest"),
            (F64X2_CEIL, "f64x2.ceil"),
            (F64X2_FLOOR, "f64x2.floor"),
            (F64X2_TRUNC, "f64x2.trunc"),
            (F64X2_NEAREST, "f64x2.nearest"),
            (I16X8_EXTADD_PAIRWISE_I8X16_S, "i16x8.extadd_pairwise_i8x16_s"),
            (I16X8_EXTADD_PAIRWISE_I8X16_U, "i16x8.extadd_pairwise_i8x16_u"),
            (I32X4_EXTADD_PAIRWISE_I16X8_S, "i32x4.extadd_pairwise_i16x8_s"),
            (I32X4_EXTADD_PAIRWISE_I16X8_U, "i32x4.extadd_pairwise_i16x8_u"),
            (I16X8_ABS, "i16x8.abs"),
            (I16X8_NEG, "i16x8.neg"),
            (I16X8_EXTEND_LOW_I8X16_S, "i16x8.extend_low_i8x16_s"),
            (I16X8_EXTEND_HIGH_I8X16_S, "i16x8.extend_high_i8x16_s"),
            (I16X8_EXTEND_LOW_I8X16_U, "i16x8.extend_low_i8x16_u"),
            (I16X8_EXTEND_HIGH_I8X16_U, "i16x8.extend_high_i8x16_u"),
            (I32X4_ABS, "i32x4.abs"),
            (I32X4_NEG, "i32x4.neg"),
            (I32X4_EXTEND_LOW_I16X8_S, "i32x4.extend_low_i16x8_s"),
            (I32X4_EXTEND_HIGH_I16X8_S, "i32x4.extend_high_i16x8_s"),
            (I32X4_EXTEND_LOW_I16X8_U, "i32x4.extend_low_i16x8_u"),
            (I32X4_EXTEND_HIGH_I16X8_U, "i32x4.extend_high_i16x8_u"),
            (I64X2_ABS, "i64x2.abs"),
            (I64X2_NEG, "i64x2.neg"),
            (I64X2_EXTEND_LOW_I32X4_S, "i64x2.extend_low_i32x4_s"),
            (I64X2_EXTEND_HIGH_I32X4_S, "i64x2.extend_high_i32x4_s"),
            (I64X2_EXTEND_LOW_I32X4_U, "i64x2.extend_low_i32x4_u"),
            (I64X2_EXTEND_HIGH_I32X4_U, "i64x2.extend_high_i32x4_u"),
            (F32X4_ABS, "f32x4.abs"),
            (F32X4_NEG, "f32x4.neg"),
            (F32X4_SQRT, "f32x4.sqrt"),
            (F64X2_ABS, "f64x2.abs"),
            (F64X2_NEG, "f64x2.neg"),
            (F64X2_SQRT, "f64x2.sqrt"),
            (I32X4_TRUNC_SAT_F32X4_S, "i32x4.trunc_sat_f32x4_s"),
            (I32X4_TRUNC_SAT_F32X4_U, "i32x4.trunc_sat_f32x4_u"),
            (F32X4_CONVERT_I32X4_S, "f32x4.convert_i32x4_s"),
            (F32X4_CONVERT_I32X4_U, "f32x4.convert_i32x4_u"),
            (I32X4_TRUNC_SAT_F64X2_S_ZERO, "i32x4.trunc_sat_f64x2_s_zero"),
            (I32X4_TRUNC_SAT_F64X2_U_ZERO, "i32x4.trunc_sat_f64x2_u_zero"),
            (F64X2_CONVERT_LOW_I32X4_S, "f64x2.convert_low_i32x4_s"),
            (F64X2_CONVERT_LOW_I32X4_U, "f64x2.convert_low_i32x4_u"),
        ],
        un(V128),
    );

    t.group(
        &[
            (I8X16_SWIZZLE, "i8x16.swizzle"),
            (I8X16_EQ, "i8x16.eq"),
            (I8X16_NE, "i8x16.ne"),
            (I8X16_LT_S, "i8x16.lt_s"),
            (I8X16_LT_U, "i8x16.lt_u"),
            (I8X16_GT_S, "i8x16.gt_s"),
            (I8X16_GT_U, "i8x16.gt_u"),
            (I8X16_LE_S, "i8x16.le_s"),
            (I8X16_LE_U, "i8x16.le_u"),
            (I8X16_GE_S, "i8x16.ge_s"),
            (I8X16_GE_U, "i8x16.ge_u"),
            (I16X8_EQ, "i16x8.eq"),
            (I16X8_NE, "i16x8.ne"),
            (I16X8_LT_S, "i16x8.lt_s"),
            (I16X8_LT_U, "i16x8.lt_u"),
            (I16X8_GT_S, "i16x8.gt_s"),
            (I16X8_GT_U, "i16x8.gt_u"),
            (I16X8_LE_S, "i16x8.le_s"),
            (I16X8_LE_U, "i16x8.le_u"),
            (I16X8_GE_S, "i16x8.ge_s"),
            (I16X8_GE_U, "i16x8.ge_u"),
            (I32X4_EQ, "i32x4.eq"),
            (I32X4_NE, "i32x4.ne"),
            (I32X4_LT_S, "i32x4.lt_s"),
            (I32X4_LT_U, "i32x4.lt_u"),
            (I32X4_GT_S, "i32x4.gt_s"),
            (I32X4_GT_U, "i32x4.gt_u"),
            (I32X4_LE_S, "i32x4.le_s"),
            (I32X4_LE_U, "i32x4.le_u"),
            (I32X4_GE_S, "i32x4.ge_s"),
            (I32X4_GE_U, "i32x4.ge_u"),
            (I64X2_EQ, "i64x2.eq"),
            (I64X2_NE, "i64x2.ne"),
            (I64X2_LT_S, "i64x2.lt_s"),
            (I64X2_GT_S, "i64x2.gt_s"),
            (I64X2_LE_S, "i64x2.le_s"),
            (I64X2_GE_S, "i64x2.ge_s"),
            (F32X4_EQ, "f32x4.eq"),
            (F32X4_NE, "f32x4.ne"),
            (F32X4_LT, "f32x4.lt"),
            (F32X4_GT, "f32x4.gt"),
            (F32X4_LE, "f32x4.le"),
            (F32X4_GE, "f32x4.ge"),
            (F64X2_EQ, "f64x2.eq"),
            (F64X2_NE, "f64x2.ne"),
            (F64X2_LT, "f64x2.lt"),
            (F64X2_GT, "f64x2.gt"),
            (F64X2_LE, "f64x2.le"),
            (F64X2_GE, "f64x2.ge"),
            (V128_AND, "v128.and"),
            (V128_ANDNOT, "v128.andnot"),
            (V128_OR, "v128.or"),
            (V128_XOR, "v128.xor"),
            (I8X16_NARROW_I16X8_S, "i8x16.narrow_i16x8_s"),
            (I8X16_NARROW_I16X8_U, "i8x16.narrow_i16x8_u"),
            (I8X16_ADD, "i8x16.add"),
            (I8X16_ADD_SAT_S, "i8x16.add_sat_s"),
            (I8X16_ADD_SAT_U, "i8x16.add_sat_u"),
            (I8X16_SUB, "i8x16.sub"),
            (I8X16_SUB_SAT_S, "i8x16.sub_sat_s"),
            (I8X16_SUB_SAT_U, "i8x16.sub_sat_u"),
            (I8X16_MIN_S, "i8x16.min_s"),
            (I8X16_MIN_U, "i8x16.min_u"),
            (I8X16_MAX_S, "i8x16.max_s"),
            (I8X16_MAX_U, "i8x16.max_u"),
            (I8X16_AVGR_U, "i8x16.avgr_u"),
            (I16X8_Q15MULR_SAT_S, "i16x8.q15mulr_sat_s"),
            (I16X8_NARROW_I32X4_S, "i16x8.narrow_i32x4_s"),
            (I16X8_NARROW_I32X4_U, "i16x8.narrow_i32x4_u"),
            (I16X8_ADD, "i16x8.add"),
            (I16X8_ADD_SAT_S, "i16x8.add_sat_s"),
            (I16X8_ADD_SAT_U, "i16x8.add_sat_u"),
            (I16X8_SUB, "i16x8.sub"),
            (I16X8_SUB_SAT_S, "i16x8.sub_sat_s"),
            (I16X8_SUB_SAT_U, "i16x8.sub_sat_u"),
            (I16X8_MUL, "i16x8.mul"),
            (I16X8_MIN_S, "i16x8.min_s"),
            (I16X8_MIN_U, "i16x8.min_u"),
            (I16X8_MAX_S, "i16x8.max_s"),
            (I16X8_MAX_U, "i16x8.max_u"),
            (I16X8_AVGR_U, "i16x8.avgr_u"),
            (I16X8_EXTMUL_LOW_I8X16_S, "i16x8.extmul_low_i8x16_s"),
            (I16X8_EXTMUL_HIGH_I8X16_S, "i16x8.extmul_high_i8x16_s"),
            (I16X8_EXTMUL_LOW_I8X16_U, "i16x8.extmul_low_i8x16_u"),
            (I16X8_EXTMUL_HIGH_I8X16_U, "i16x8.extmul_high_i8x16_u"),
            (I32X4_ADD, "i32x4.add"),
            (I32X4_SUB, "i32x4.sub"),
            (I32X4_MUL, "i32x4.mul"),
            (I32X4_MIN_S, "i32x4.min_s"),
            (I32X4_MIN_U, "i32x4.min_u"),
            (I32X4_MAX_S, "i32x4.max_s"),
            (I32X4_MAX_U, "i32x4.max_u"),
            (I32X4_DOT_I16X8_S, "i32x4.dot_i16x8_s"),
            (I32X4_EXTMUL_LOW_I16X8_S, "i32x4.extmul_low_i16x8_s"),
            (I32X4_EXTMUL_HIGH_I16X8_S, "i32x4.extmul_high_i16x8_s"),
            (I32X4_EXTMUL_LOW_I16X8_U, "i32x4.extmul_low_i16x8_u"),
            (I32X4_EXTMUL_HIGH_I16X8_U, "i32x4.extmul_high_i16x8_u"),
            (I64X2_ADD, "i64x2.add"),
            (I64X2_SUB, "i64x2.sub"),
            (I64X2_MUL, "i64x2.mul"),
            (I64X2_EXTMUL_LOW_I32X4_S, "i64x2.extmul_low_i32x4_s"),
            (I64X2_EXTMUL_HIGH_I32X4_S, "i64x2.extmul_high_i32x4_s"),
            (I64X2_EXTMUL_LOW_I32X4_U, "i64x2.extmul_low_i32x4_u"),
            (I64X2_EXTMUL_HIGH_I32X4_U, "i64x2.extmul_high_i32x4_u"),
            (F32X4_ADD, "f32x4.add"),
            (F32X4_SUB, "f32x4.sub"),
            (F32X4_MUL, "f32x4.mul"),
            (F32X4_DIV, "f32x4.div"),
            (F32X4_MIN, "f32x4.min"),
            (F32X4_MAX, "f32x4.max"),
            (F32X4_PMIN, "f32x4.pmin"),
            (F32X4_PMAX, "f32x4.pmax"),
            (F64X2_ADD, "f64x2.add"),
            (F64X2_SUB, "f64x2.sub"),
            (F64X2_MUL, "f64x2.mul"),
            (F64X2_DIV, "f64x2.div"),
            (F64X2_MIN, "f64x2.min"),
            (F64X2_MAX, "f64x2.max"),
            (F64X2_PMIN, "f64x2.pmin"),
            (F64X2_PMAX, "f64x2.pmax"),
        ],
        bin(V128),
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_opcode_has_one_entry() {
        let opcodes = all_opcodes();
        // 0xFD 0x9A, 0xA2, 0xA5, 0xA6, 0xAF, 0xB0, 0xB2..0xB4, 0xBB, 0xC2,
        // 0xC5, 0xC6, 0xCF, 0xD0, 0xD2..0xD4, 0xE2 and 0xEE are unassigned
        let vector = opcodes.iter().filter(|op| matches!(op, Opcode::Vector(_))).count();
        assert_eq!(vector, 236);
        let misc = opcodes.iter().filter(|op| matches!(op, Opcode::Misc(_))).count();
        assert_eq!(misc, 18);
        for opcode in opcodes {
            let attrs = lookup(opcode).unwrap();
            assert_eq!(attrs.opcode, opcode);
        }
    }

    #[test]
    fn test_signatures() {
        let add = lookup(I32_ADD).unwrap();
        assert_eq!(add.mnemonic, "i32.add");
        assert_eq!(add.immediates, Immediates::Insn);
        assert_eq!(add.stack, sig(&[I32, I32], &[I32]));

        assert_eq!(lookup(F64_CONST).unwrap().stack, sig(&[], &[F64]));
        assert_eq!(lookup(I64_STORE8).unwrap().stack, sig(&[I32, I64], &[]));
        assert_eq!(lookup(I32_WRAP_I64).unwrap().stack, sig(&[I64], &[I32]));
        assert_eq!(lookup(I8X16_SHL).unwrap().stack, sig(&[V128, I32], &[V128]));
        assert_eq!(lookup(CALL).unwrap().stack, None);
    }

    #[test]
    fn test_memory_attributes() {
        let load = lookup(I64_LOAD32_U).unwrap();
        assert_eq!(load.mem_bits, Some(32));
        assert_eq!(load.natural_alignment(), Some(2));
        assert_eq!(lookup(V128_LOAD).unwrap().natural_alignment(), Some(4));
        assert_eq!(lookup(I32_LOAD8_S).unwrap().natural_alignment(), Some(0));

        assert_eq!(lookup(MEMORY_COPY).unwrap().reserved, 2);
        assert_eq!(lookup(MEMORY_FILL).unwrap().reserved, 1);
        assert_eq!(lookup(MEMORY_INIT).unwrap().reserved, 1);
        assert_eq!(lookup(DATA_DROP).unwrap().reserved, 0);
    }

    #[test]
    fn test_vector_shapes() {
        assert_eq!(lookup(I16X8_EXTRACT_LANE_S).unwrap().shape, Some(VectorShape::I16x8));
        assert_eq!(lookup(F64X2_REPLACE_LANE).unwrap().shape.unwrap().lanes(), 2);
        assert_eq!(lookup(V128_LOAD32_LANE).unwrap().shape, Some(VectorShape::I32x4));
        assert_eq!(lookup(V128_AND).unwrap().shape, None);
        assert_eq!(VectorShape::I64x2.lane_type(), I64);
    }

    #[test]
    fn test_lookup_mnemonic() {
        assert_eq!(lookup_mnemonic("i8x16.shuffle").unwrap().opcode, I8X16_SHUFFLE);
        assert_eq!(lookup_mnemonic("table.copy").unwrap().opcode, TABLE_COPY);
        assert_eq!(lookup_mnemonic("select").unwrap().opcode, SELECT);
        assert!(lookup_mnemonic("i32.frobnicate").is_none());
    }
}
