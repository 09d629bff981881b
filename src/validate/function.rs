//! Operand and control stack checking for one function body.
//!
//! Every instruction pops its operand types and pushes its result types, and
//! every structured instruction opens a control frame remembering the stack
//! height at entry. After an unconditional branch the frame is marked
//! unreachable and pops below its height produce [`MaybeType::Unknown`]
//! instead of failing.

use crate::error::{Error, IndexSpace, Location, Result};
use crate::parser::attributes::{self, Immediates, InsnAttributes, StackType};
use crate::parser::opcodes::*;
use crate::parser::types::{format_types, BlockType, Const, MemArg, ValueType};
use crate::parser::visitor::ExprVisitor;
use crate::validate::context::ModuleContext;
use std::fmt;
use std::sync::Arc;

/// One operand stack slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaybeType {
    Known(ValueType),
    /// Produced by popping an empty stack in unreachable code; matches any type.
    Unknown,
}

impl MaybeType {
    fn is_num_or_vec(&self) -> bool {
        match self {
            MaybeType::Known(t) => t.is_num() || t.is_vec(),
            MaybeType::Unknown => true,
        }
    }

    fn is_ref(&self) -> bool {
        match self {
            MaybeType::Known(t) => t.is_ref(),
            MaybeType::Unknown => true,
        }
    }
}

impl fmt::Display for MaybeType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MaybeType::Known(t) => write!(f, "{}", t),
            MaybeType::Unknown => f.write_str("unknown"),
        }
    }
}

#[derive(Debug, Clone)]
struct CtrlFrame {
    opcode: Opcode,
    start_types: Vec<ValueType>,
    end_types: Vec<ValueType>,
    height: usize,
    unreachable: bool,
}

pub struct FunctionValidator {
    ctx: Arc<ModuleContext>,
    function: u32,
    /// Parameters followed by declared locals.
    locals: Vec<ValueType>,
    vals: Vec<MaybeType>,
    ctrls: Vec<CtrlFrame>,
    index: usize,
    finished: bool,
}

impl FunctionValidator {
    /// Prepares to check the body of `function`, whose declared locals (not
    /// including parameters) are `locals`.
    pub fn new(ctx: Arc<ModuleContext>, function: u32, locals: &[ValueType]) -> Result<Self> {
        let func_type = ctx.func_type(function, Location::Module)?.clone();
        let mut all_locals = func_type.params.clone();
        all_locals.extend_from_slice(locals);

        let mut v = FunctionValidator {
            ctx,
            function,
            locals: all_locals,
            vals: vec![],
            ctrls: vec![],
            index: 0,
            finished: false,
        };
        // parameters are not on the stack until loaded with local.get
        v.push_ctrl(BLOCK, vec![], func_type.results);
        Ok(v)
    }

    pub fn function(&self) -> u32 {
        self.function
    }

    /// The operand stack, bottom first.
    pub fn stack(&self) -> &[MaybeType] {
        &self.vals
    }

    /// Open control frames, including the function's own.
    pub fn depth(&self) -> usize {
        self.ctrls.len()
    }

    /// Whether the final `end` has been checked.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Location of the instruction being visited; advances the counter.
    fn begin(&mut self) -> Result<Location> {
        let at = Location::Instruction {
            function: self.function,
            index: self.index,
        };
        if self.finished {
            return Err(Error::invalid(at, "instruction after the end of the function"));
        }
        self.index += 1;
        Ok(at)
    }

    fn push_val(&mut self, val: MaybeType) {
        self.vals.push(val);
    }

    fn push_vals(&mut self, types: &[ValueType]) {
        self.vals.extend(types.iter().map(|t| MaybeType::Known(*t)));
    }

    fn pop_val(&mut self, at: Location) -> Result<MaybeType> {
        let frame = self
            .ctrls
            .last()
            .ok_or_else(|| Error::invalid(at, "no enclosing block"))?;
        if self.vals.len() == frame.height {
            if frame.unreachable {
                return Ok(MaybeType::Unknown);
            }
            return Err(Error::type_mismatch(at, "expected a value but the stack is empty"));
        }
        self.vals
            .pop()
            .ok_or_else(|| Error::type_mismatch(at, "expected a value but the stack is empty"))
    }

    fn pop_expected(&mut self, expected: ValueType, at: Location) -> Result<MaybeType> {
        match self.pop_val(at) {
            Ok(MaybeType::Known(actual)) if actual != expected => Err(Error::type_mismatch(
                at,
                format!("expected {} but found {}", expected, actual),
            )),
            Ok(popped) => Ok(popped),
            Err(Error::TypeMismatch { .. }) => Err(Error::type_mismatch(
                at,
                format!("expected {} but the stack is empty", expected),
            )),
            Err(err) => Err(err),
        }
    }

    /// Pops `types` (given bottom first) and returns what was popped, bottom
    /// first.
    fn pop_expecteds(&mut self, types: &[ValueType], at: Location) -> Result<Vec<MaybeType>> {
        let mut popped = Vec::with_capacity(types.len());
        for t in types.iter().rev() {
            popped.push(self.pop_expected(*t, at)?);
        }
        popped.reverse();
        Ok(popped)
    }

    fn push_ctrl(&mut self, opcode: Opcode, start_types: Vec<ValueType>, end_types: Vec<ValueType>) {
        let height = self.vals.len();
        self.push_vals(&start_types);
        self.ctrls.push(CtrlFrame {
            opcode,
            start_types,
            end_types,
            height,
            unreachable: false,
        });
    }

    fn pop_ctrl(&mut self, at: Location) -> Result<CtrlFrame> {
        let (end_types, height) = match self.ctrls.last() {
            Some(frame) => (frame.end_types.clone(), frame.height),
            None => return Err(Error::invalid(at, "unexpected end")),
        };
        self.pop_expecteds(&end_types, at)?;
        if self.vals.len() != height {
            return Err(Error::type_mismatch(
                at,
                format!(
                    "{} values remain on the stack at the end of a block returning {}",
                    self.vals.len() - height,
                    format_types(&end_types)
                ),
            ));
        }
        self.ctrls
            .pop()
            .ok_or_else(|| Error::invalid(at, "unexpected end"))
    }

    /// Types a branch to `label` must provide: a loop's parameters, any
    /// other block's results.
    fn label_types(&self, label: u32, at: Location) -> Result<Vec<ValueType>> {
        let depth = label as usize;
        if depth >= self.ctrls.len() {
            return Err(Error::UnknownIndex {
                space: IndexSpace::Label,
                index: label,
                location: at,
            });
        }
        let frame = &self.ctrls[self.ctrls.len() - 1 - depth];
        if frame.opcode == LOOP {
            Ok(frame.start_types.clone())
        } else {
            Ok(frame.end_types.clone())
        }
    }

    fn unreachable(&mut self) {
        if let Some(frame) = self.ctrls.last_mut() {
            self.vals.truncate(frame.height);
            frame.unreachable = true;
        }
    }

    fn local(&self, index: u32, at: Location) -> Result<ValueType> {
        self.locals
            .get(index as usize)
            .copied()
            .ok_or(Error::UnknownIndex {
                space: IndexSpace::Local,
                index,
                location: at,
            })
    }

    fn apply(&mut self, stack: &StackType, at: Location) -> Result<()> {
        self.pop_expecteds(&stack.pops, at)?;
        self.push_vals(&stack.pushes);
        Ok(())
    }

    fn attributes(op: Opcode, at: Location) -> Result<&'static InsnAttributes> {
        attributes::lookup(op).ok_or_else(|| Error::invalid(at, format!("illegal opcode {}", op)))
    }

    /// The attributes of `op`, which must arrive through the visitor method
    /// that carries its kind of immediates.
    fn routed(op: Opcode, immediates: Immediates, at: Location) -> Result<&'static InsnAttributes> {
        let attrs = Self::attributes(op, at)?;
        if attrs.immediates != immediates {
            return Err(Error::invalid(
                at,
                format!("{} does not take {:?} immediates", attrs.mnemonic, immediates),
            ));
        }
        Ok(attrs)
    }

    fn fixed_signature(attrs: &InsnAttributes, at: Location) -> Result<&StackType> {
        attrs.stack.as_ref().ok_or_else(|| {
            Error::invalid(at, format!("{} cannot be checked without its immediates", attrs.mnemonic))
        })
    }

    fn check_memarg(&self, attrs: &InsnAttributes, memarg: MemArg, at: Location) -> Result<()> {
        self.ctx.memory(0, at)?;
        if let (Some(natural), Some(bits)) = (attrs.natural_alignment(), attrs.mem_bits) {
            if memarg.align > natural {
                return Err(Error::InvalidAlignment {
                    location: at,
                    align: memarg.align,
                    natural: bits / 8,
                });
            }
        }
        Ok(())
    }

    fn end_types(&self) -> Vec<ValueType> {
        self.ctrls
            .first()
            .map(|frame| frame.end_types.clone())
            .unwrap_or_default()
    }
}

impl ExprVisitor for FunctionValidator {
    fn visit_insn(&mut self, op: Opcode) -> Result<()> {
        let at = self.begin()?;
        let attrs = Self::routed(op, Immediates::Insn, at)?;
        match op {
            UNREACHABLE => {
                self.unreachable();
                Ok(())
            }
            RETURN => {
                let results = self.end_types();
                self.pop_expecteds(&results, at)?;
                self.unreachable();
                Ok(())
            }
            DROP => self.pop_val(at).map(|_| ()),
            SELECT => {
                self.pop_expected(ValueType::I32, at)?;
                let t1 = self.pop_val(at)?;
                let t2 = self.pop_val(at)?;
                if !t1.is_num_or_vec() || !t2.is_num_or_vec() {
                    return Err(Error::type_mismatch(
                        at,
                        "select without a type needs numeric or vector operands",
                    ));
                }
                let result = match (t1, t2) {
                    (MaybeType::Known(a), MaybeType::Known(b)) if a != b => {
                        return Err(Error::type_mismatch(
                            at,
                            format!("select operands differ: {} and {}", b, a),
                        ))
                    }
                    (MaybeType::Unknown, other) => other,
                    (known, _) => known,
                };
                self.push_val(result);
                Ok(())
            }
            REF_IS_NULL => {
                let t = self.pop_val(at)?;
                if !t.is_ref() {
                    return Err(Error::type_mismatch(
                        at,
                        format!("expected a reference but found {}", t),
                    ));
                }
                self.push_val(MaybeType::Known(ValueType::I32));
                Ok(())
            }
            _ => {
                if attrs.reserved > 0 || attrs.mem_bits.is_some() {
                    self.ctx.memory(0, at)?;
                }
                let stack = Self::fixed_signature(attrs, at)?;
                self.apply(stack, at)
            }
        }
    }

    fn visit_const(&mut self, value: Const) -> Result<()> {
        self.begin()?;
        self.push_val(MaybeType::Known(value.value_type()));
        Ok(())
    }

    fn visit_ref_null(&mut self, ref_type: ValueType) -> Result<()> {
        let at = self.begin()?;
        if !ref_type.is_ref() {
            return Err(Error::invalid(at, format!("{} is not a reference type", ref_type)));
        }
        self.push_val(MaybeType::Known(ref_type));
        Ok(())
    }

    fn visit_ref_func(&mut self, func: u32) -> Result<()> {
        let at = self.begin()?;
        self.ctx.func_type(func, at)?;
        if !self.ctx.declared_refs.contains(&func) {
            return Err(Error::invalid(at, format!("undeclared function reference {}", func)));
        }
        self.push_val(MaybeType::Known(ValueType::FuncRef));
        Ok(())
    }

    fn visit_select_typed(&mut self, types: &[ValueType]) -> Result<()> {
        let at = self.begin()?;
        let t = match types {
            [t] => *t,
            _ => return Err(Error::invalid(at, "typed select needs exactly one result type")),
        };
        self.pop_expected(ValueType::I32, at)?;
        self.pop_expected(t, at)?;
        self.pop_expected(t, at)?;
        self.push_val(MaybeType::Known(t));
        Ok(())
    }

    fn visit_variable(&mut self, op: Opcode, index: u32) -> Result<()> {
        let at = self.begin()?;
        match op {
            LOCAL_GET => {
                let t = self.local(index, at)?;
                self.push_val(MaybeType::Known(t));
            }
            LOCAL_SET => {
                let t = self.local(index, at)?;
                self.pop_expected(t, at)?;
            }
            LOCAL_TEE => {
                let t = self.local(index, at)?;
                self.pop_expected(t, at)?;
                self.push_val(MaybeType::Known(t));
            }
            GLOBAL_GET => {
                let t = self.ctx.global(index, at)?.value_type;
                self.push_val(MaybeType::Known(t));
            }
            GLOBAL_SET => {
                let global = *self.ctx.global(index, at)?;
                if !global.mutable {
                    return Err(Error::invalid(at, format!("global {} is immutable", index)));
                }
                self.pop_expected(global.value_type, at)?;
            }
            _ => return Err(Error::invalid(at, format!("{} is not a variable instruction", op))),
        }
        Ok(())
    }

    fn visit_table(&mut self, op: Opcode, index: u32) -> Result<()> {
        let at = self.begin()?;
        if op == ELEM_DROP {
            self.ctx.elem_type(index, at)?;
            return Ok(());
        }
        let elem_type = self.ctx.table(index, at)?.elem_type;
        match op {
            TABLE_GET => {
                self.pop_expected(ValueType::I32, at)?;
                self.push_val(MaybeType::Known(elem_type));
            }
            TABLE_SET => {
                self.pop_expected(elem_type, at)?;
                self.pop_expected(ValueType::I32, at)?;
            }
            TABLE_GROW => {
                self.pop_expected(ValueType::I32, at)?;
                self.pop_expected(elem_type, at)?;
                self.push_val(MaybeType::Known(ValueType::I32));
            }
            TABLE_SIZE => self.push_val(MaybeType::Known(ValueType::I32)),
            TABLE_FILL => {
                self.pop_expected(ValueType::I32, at)?;
                self.pop_expected(elem_type, at)?;
                self.pop_expected(ValueType::I32, at)?;
            }
            _ => return Err(Error::invalid(at, format!("{} is not a table instruction", op))),
        }
        Ok(())
    }

    fn visit_table_pair(&mut self, op: Opcode, first: u32, second: u32) -> Result<()> {
        let at = self.begin()?;
        let (dst, src) = match op {
            TABLE_INIT => (self.ctx.table(second, at)?.elem_type, self.ctx.elem_type(first, at)?),
            TABLE_COPY => (self.ctx.table(first, at)?.elem_type, self.ctx.table(second, at)?.elem_type),
            _ => return Err(Error::invalid(at, format!("{} does not take two indices", op))),
        };
        if dst != src {
            return Err(Error::type_mismatch(
                at,
                format!("cannot copy {} elements into a {} table", src, dst),
            ));
        }
        let stack = Self::fixed_signature(Self::routed(op, Immediates::TablePair, at)?, at)?;
        self.apply(stack, at)
    }

    fn visit_mem(&mut self, op: Opcode, memarg: MemArg) -> Result<()> {
        let at = self.begin()?;
        let attrs = Self::routed(op, Immediates::Mem, at)?;
        self.check_memarg(attrs, memarg, at)?;
        self.apply(Self::fixed_signature(attrs, at)?, at)
    }

    fn visit_mem_lane(&mut self, op: Opcode, memarg: MemArg, lane: u8) -> Result<()> {
        let at = self.begin()?;
        let attrs = Self::routed(op, Immediates::MemLane, at)?;
        self.check_memarg(attrs, memarg, at)?;
        let lanes = attrs.mem_bits.map(|bits| 128 / bits).unwrap_or(0);
        if u32::from(lane) >= lanes {
            return Err(Error::invalid(at, format!("lane index {} out of range", lane)));
        }
        self.apply(Self::fixed_signature(attrs, at)?, at)
    }

    fn visit_indexed_mem(&mut self, op: Opcode, data: u32) -> Result<()> {
        let at = self.begin()?;
        let attrs = Self::routed(op, Immediates::IndexedMem, at)?;
        if op == MEMORY_INIT {
            self.ctx.memory(0, at)?;
        }
        self.ctx.data(data, at)?;
        self.apply(Self::fixed_signature(attrs, at)?, at)
    }

    fn visit_block(&mut self, op: Opcode, block_type: BlockType) -> Result<()> {
        let at = self.begin()?;
        let (params, results) = self.ctx.block_type(block_type, at)?;
        if op == IF {
            self.pop_expected(ValueType::I32, at)?;
        }
        self.pop_expecteds(&params, at)?;
        self.push_ctrl(op, params, results);
        Ok(())
    }

    fn visit_else(&mut self) -> Result<()> {
        let at = self.begin()?;
        if self.ctrls.len() <= 1 || self.ctrls.last().map(|frame| frame.opcode) != Some(IF) {
            return Err(Error::invalid(at, "else without a matching if"));
        }
        let frame = self.pop_ctrl(at)?;
        self.push_ctrl(ELSE, frame.start_types, frame.end_types);
        Ok(())
    }

    fn visit_end_insn(&mut self) -> Result<()> {
        let at = self.begin()?;
        if self.ctrls.len() <= 1 {
            return Err(Error::invalid(at, "end without a matching block"));
        }
        let frame = self.pop_ctrl(at)?;
        if frame.opcode == IF && frame.start_types != frame.end_types {
            return Err(Error::type_mismatch(
                at,
                format!(
                    "if without else must leave its parameters unchanged: {} -> {}",
                    format_types(&frame.start_types),
                    format_types(&frame.end_types)
                ),
            ));
        }
        self.push_vals(&frame.end_types);
        Ok(())
    }

    fn visit_break(&mut self, op: Opcode, label: u32) -> Result<()> {
        let at = self.begin()?;
        if op == BR_IF {
            self.pop_expected(ValueType::I32, at)?;
        }
        let types = self.label_types(label, at)?;
        self.pop_expecteds(&types, at)?;
        if op == BR_IF {
            self.push_vals(&types);
        } else {
            self.unreachable();
        }
        Ok(())
    }

    fn visit_br_table(&mut self, labels: &[u32], default: u32) -> Result<()> {
        let at = self.begin()?;
        self.pop_expected(ValueType::I32, at)?;
        let default_types = self.label_types(default, at)?;
        for label in labels {
            let types = self.label_types(*label, at)?;
            if types.len() != default_types.len() {
                return Err(Error::type_mismatch(
                    at,
                    format!(
                        "br_table label {} has arity {} but the default has {}",
                        label,
                        types.len(),
                        default_types.len()
                    ),
                ));
            }
            let popped = self.pop_expecteds(&types, at)?;
            self.vals.extend(popped);
        }
        self.pop_expecteds(&default_types, at)?;
        self.unreachable();
        Ok(())
    }

    fn visit_call(&mut self, func: u32) -> Result<()> {
        let at = self.begin()?;
        let func_type = self.ctx.func_type(func, at)?.clone();
        self.pop_expecteds(&func_type.params, at)?;
        self.push_vals(&func_type.results);
        Ok(())
    }

    fn visit_call_indirect(&mut self, table: u32, type_index: u32) -> Result<()> {
        let at = self.begin()?;
        let elem_type = self.ctx.table(table, at)?.elem_type;
        if elem_type != ValueType::FuncRef {
            return Err(Error::type_mismatch(
                at,
                format!("call_indirect needs a funcref table, table {} holds {}", table, elem_type),
            ));
        }
        let func_type = self.ctx.func_type_at(type_index, at)?.clone();
        self.pop_expected(ValueType::I32, at)?;
        self.pop_expecteds(&func_type.params, at)?;
        self.push_vals(&func_type.results);
        Ok(())
    }

    fn visit_lane(&mut self, op: Opcode, lane: u8) -> Result<()> {
        let at = self.begin()?;
        let attrs = Self::routed(op, Immediates::Lane, at)?;
        let lanes = attrs.shape.map(|shape| shape.lanes()).unwrap_or(0);
        if lane >= lanes {
            return Err(Error::invalid(at, format!("lane index {} out of range", lane)));
        }
        self.apply(Self::fixed_signature(attrs, at)?, at)
    }

    fn visit_shuffle(&mut self, lanes: [u8; 16]) -> Result<()> {
        let at = self.begin()?;
        if let Some(lane) = lanes.iter().find(|lane| **lane >= 32) {
            return Err(Error::invalid(at, format!("shuffle lane index {} out of range", lane)));
        }
        let stack = Self::fixed_signature(Self::attributes(I8X16_SHUFFLE, at)?, at)?;
        self.apply(stack, at)
    }

    fn visit_end(&mut self) -> Result<()> {
        let at = self.begin()?;
        if self.ctrls.len() != 1 {
            return Err(Error::invalid(
                at,
                format!("{} blocks are not terminated", self.ctrls.len().saturating_sub(1)),
            ));
        }
        self.pop_ctrl(at)?;
        self.finished = true;
        Ok(())
    }
}
