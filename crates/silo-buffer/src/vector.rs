//! Typed append-only column vectors.
//!
//! Storage is a tagged variant over a handful of concrete layouts rather than
//! an open trait hierarchy: fixed-width primitives, a packed bit vector for
//! booleans, offsets+bytes for variable-width text/binary, 128-bit unscaled
//! decimals, and the two-child (epoch, fraction) struct used by
//! high-precision timestamps. Every layout pairs its values with a validity
//! bitmap; for every appended row index either the validity bit is unset
//! (null) or the storage holds a well-typed value.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::BytesMut;

use silo_types::numeric::EpochFraction;

use crate::alloc::{BufferAllocator, Reservation};
use crate::bitmap::Bitmap;

/// Fixed-width storage for `Copy` primitives plus a validity bitmap.
#[derive(Debug)]
pub struct PrimitiveVector<T> {
    values: Vec<T>,
    validity: Bitmap,
    reservation: Reservation,
}

impl<T: Copy + Default> PrimitiveVector<T> {
    fn new(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self {
            values: Vec::with_capacity(capacity),
            validity: Bitmap::with_capacity(capacity),
            reservation: Reservation::new(allocator),
        }
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Append a value.
    pub fn append(&mut self, value: T) {
        self.values.push(value);
        self.validity.push(true);
        self.track();
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        self.values.push(T::default());
        self.validity.push(false);
        self.track();
    }

    /// The value at `index`, or `None` for null or out-of-range slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<T> {
        self.validity.get(index).then(|| self.values[index])
    }

    /// Raw values, including defaulted null slots.
    #[must_use]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Validity bitmap.
    #[must_use]
    pub fn validity(&self) -> &Bitmap {
        &self.validity
    }

    fn set_value_count(&mut self, count: usize) {
        while self.len() < count {
            self.append_null();
        }
        self.values.truncate(count);
        self.validity.truncate(count);
        self.track();
    }

    fn clear(&mut self) {
        self.values = Vec::new();
        self.validity.clear();
        self.track();
    }

    fn fresh(&self) -> Self {
        Self::new(Arc::clone(self.reservation.allocator()), 0)
    }

    fn capacity_bytes(&self) -> usize {
        self.values.capacity() * size_of::<T>() + self.validity.capacity_bytes()
    }

    fn track(&mut self) {
        let capacity = self.capacity_bytes();
        self.reservation.resize(capacity);
    }
}

/// Packed 1-bit boolean storage plus a validity bitmap.
#[derive(Debug)]
pub struct BitVector {
    values: Bitmap,
    validity: Bitmap,
    reservation: Reservation,
}

impl BitVector {
    fn new(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self {
            values: Bitmap::with_capacity(capacity),
            validity: Bitmap::with_capacity(capacity),
            reservation: Reservation::new(allocator),
        }
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Append a boolean.
    pub fn append(&mut self, value: bool) {
        self.values.push(value);
        self.validity.push(true);
        self.track();
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        self.values.push(false);
        self.validity.push(false);
        self.track();
    }

    /// The value at `index`, or `None` for null or out-of-range slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<bool> {
        self.validity.get(index).then(|| self.values.get(index))
    }

    fn set_value_count(&mut self, count: usize) {
        while self.len() < count {
            self.append_null();
        }
        self.values.truncate(count);
        self.validity.truncate(count);
        self.track();
    }

    fn clear(&mut self) {
        self.values.clear();
        self.validity.clear();
        self.track();
    }

    fn fresh(&self) -> Self {
        Self::new(Arc::clone(self.reservation.allocator()), 0)
    }

    fn capacity_bytes(&self) -> usize {
        self.values.capacity_bytes() + self.validity.capacity_bytes()
    }

    fn track(&mut self) {
        let capacity = self.capacity_bytes();
        self.reservation.resize(capacity);
    }
}

/// Variable-width storage: offsets into a shared byte payload.
#[derive(Debug)]
pub struct VarLenVector {
    offsets: Vec<u64>,
    data: BytesMut,
    validity: Bitmap,
    reservation: Reservation,
}

impl VarLenVector {
    fn new(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        let mut offsets = Vec::with_capacity(capacity + 1);
        offsets.push(0);
        Self {
            offsets,
            data: BytesMut::new(),
            validity: Bitmap::with_capacity(capacity),
            reservation: Reservation::new(allocator),
        }
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Append a byte slice.
    pub fn append(&mut self, value: &[u8]) {
        self.data.extend_from_slice(value);
        self.offsets.push(self.data.len() as u64);
        self.validity.push(true);
        self.track();
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        self.offsets.push(self.data.len() as u64);
        self.validity.push(false);
        self.track();
    }

    /// The bytes at `index`, or `None` for null or out-of-range slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<&[u8]> {
        self.validity.get(index).then(|| {
            let start = self.offsets[index] as usize;
            let end = self.offsets[index + 1] as usize;
            &self.data[start..end]
        })
    }

    /// The UTF-8 text at `index`; `None` for null slots or non-UTF-8 payload.
    #[must_use]
    pub fn text_at(&self, index: usize) -> Option<&str> {
        self.value_at(index).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Total payload bytes.
    #[must_use]
    pub fn payload_len(&self) -> usize {
        self.data.len()
    }

    fn set_value_count(&mut self, count: usize) {
        while self.len() < count {
            self.append_null();
        }
        if count < self.len() {
            self.offsets.truncate(count + 1);
            self.data.truncate(self.offsets[count] as usize);
            self.validity.truncate(count);
        }
        self.track();
    }

    fn clear(&mut self) {
        self.offsets = vec![0];
        self.data = BytesMut::new();
        self.validity.clear();
        self.track();
    }

    fn fresh(&self) -> Self {
        Self::new(Arc::clone(self.reservation.allocator()), 0)
    }

    fn capacity_bytes(&self) -> usize {
        self.offsets.capacity() * size_of::<u64>()
            + self.data.capacity()
            + self.validity.capacity_bytes()
    }

    fn track(&mut self) {
        let capacity = self.capacity_bytes();
        self.reservation.resize(capacity);
    }
}

/// 128-bit unscaled decimal storage with the declared precision and scale.
#[derive(Debug)]
pub struct DecimalVector {
    values: PrimitiveVector<i128>,
    precision: u32,
    scale: u32,
}

impl DecimalVector {
    fn new(allocator: Arc<BufferAllocator>, capacity: usize, precision: u32, scale: u32) -> Self {
        Self {
            values: PrimitiveVector::new(allocator, capacity),
            precision,
            scale,
        }
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Append an unscaled value.
    pub fn append(&mut self, unscaled: i128) {
        self.values.append(unscaled);
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        self.values.append_null();
    }

    /// The unscaled value at `index`, or `None` for null slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<i128> {
        self.values.value_at(index)
    }

    /// Declared precision.
    #[must_use]
    pub fn precision(&self) -> u32 {
        self.precision
    }

    /// Declared scale.
    #[must_use]
    pub fn scale(&self) -> u32 {
        self.scale
    }

    fn set_value_count(&mut self, count: usize) {
        self.values.set_value_count(count);
    }

    fn clear(&mut self) {
        self.values.clear();
    }

    fn fresh(&self) -> Self {
        Self {
            values: self.values.fresh(),
            precision: self.precision,
            scale: self.scale,
        }
    }
}

/// Two-child struct storage for high-precision timestamps: whole epoch
/// seconds plus a nanosecond fraction. Null slots null both children.
#[derive(Debug)]
pub struct TimestampVector {
    validity: Bitmap,
    epochs: PrimitiveVector<i64>,
    fractions: PrimitiveVector<i32>,
}

impl TimestampVector {
    fn new(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self {
            validity: Bitmap::with_capacity(capacity),
            epochs: PrimitiveVector::new(Arc::clone(&allocator), capacity),
            fractions: PrimitiveVector::new(allocator, capacity),
        }
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.validity.len()
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.validity.is_empty()
    }

    /// Append an (epoch, fraction) pair.
    pub fn append(&mut self, epoch: i64, fraction: i32) {
        self.validity.push(true);
        self.epochs.append(epoch);
        self.fractions.append(fraction);
    }

    /// Append a null slot, nulling both children.
    pub fn append_null(&mut self) {
        self.validity.push(false);
        self.epochs.append_null();
        self.fractions.append_null();
    }

    /// The pair at `index`, or `None` for null or out-of-range slots.
    #[must_use]
    pub fn value_at(&self, index: usize) -> Option<EpochFraction> {
        if !self.validity.get(index) {
            return None;
        }
        let epoch = self.epochs.value_at(index)?;
        let fraction = self.fractions.value_at(index)?;
        Some(EpochFraction { epoch, fraction })
    }

    /// The epoch child.
    #[must_use]
    pub fn epochs(&self) -> &PrimitiveVector<i64> {
        &self.epochs
    }

    /// The fraction child.
    #[must_use]
    pub fn fractions(&self) -> &PrimitiveVector<i32> {
        &self.fractions
    }

    fn set_value_count(&mut self, count: usize) {
        while self.len() < count {
            self.append_null();
        }
        self.validity.truncate(count);
        self.epochs.set_value_count(count);
        self.fractions.set_value_count(count);
    }

    fn clear(&mut self) {
        self.validity.clear();
        self.epochs.clear();
        self.fractions.clear();
    }

    fn fresh(&self) -> Self {
        Self {
            validity: Bitmap::new(),
            epochs: self.epochs.fresh(),
            fractions: self.fractions.fresh(),
        }
    }
}

/// Tagged union over the concrete vector layouts.
#[derive(Debug)]
pub enum VectorData {
    /// Signed 1-byte integers.
    Int8(PrimitiveVector<i8>),
    /// Signed 2-byte integers.
    Int16(PrimitiveVector<i16>),
    /// Signed 4-byte integers.
    Int32(PrimitiveVector<i32>),
    /// Signed 8-byte integers.
    Int64(PrimitiveVector<i64>),
    /// IEEE double-precision floats.
    Float64(PrimitiveVector<f64>),
    /// 128-bit unscaled decimals.
    Decimal128(DecimalVector),
    /// Packed booleans.
    Boolean(BitVector),
    /// Variable-width UTF-8 text.
    Utf8(VarLenVector),
    /// Variable-width binary.
    Binary(VarLenVector),
    /// (epoch, fraction) timestamp struct.
    Timestamp(TimestampVector),
}

impl VectorData {
    pub(crate) fn int8(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Int8(PrimitiveVector::new(allocator, capacity))
    }

    pub(crate) fn int16(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Int16(PrimitiveVector::new(allocator, capacity))
    }

    pub(crate) fn int32(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Int32(PrimitiveVector::new(allocator, capacity))
    }

    pub(crate) fn int64(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Int64(PrimitiveVector::new(allocator, capacity))
    }

    pub(crate) fn float64(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Float64(PrimitiveVector::new(allocator, capacity))
    }

    pub(crate) fn decimal128(
        allocator: Arc<BufferAllocator>,
        capacity: usize,
        precision: u32,
        scale: u32,
    ) -> Self {
        Self::Decimal128(DecimalVector::new(allocator, capacity, precision, scale))
    }

    pub(crate) fn boolean(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Boolean(BitVector::new(allocator, capacity))
    }

    pub(crate) fn utf8(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Utf8(VarLenVector::new(allocator, capacity))
    }

    pub(crate) fn binary(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Binary(VarLenVector::new(allocator, capacity))
    }

    pub(crate) fn timestamp(allocator: Arc<BufferAllocator>, capacity: usize) -> Self {
        Self::Timestamp(TimestampVector::new(allocator, capacity))
    }

    /// Number of appended slots.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Int8(v) => v.len(),
            Self::Int16(v) => v.len(),
            Self::Int32(v) => v.len(),
            Self::Int64(v) => v.len(),
            Self::Float64(v) => v.len(),
            Self::Decimal128(v) => v.len(),
            Self::Boolean(v) => v.len(),
            Self::Utf8(v) | Self::Binary(v) => v.len(),
            Self::Timestamp(v) => v.len(),
        }
    }

    /// Whether no slots have been appended.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Append a null slot.
    pub fn append_null(&mut self) {
        match self {
            Self::Int8(v) => v.append_null(),
            Self::Int16(v) => v.append_null(),
            Self::Int32(v) => v.append_null(),
            Self::Int64(v) => v.append_null(),
            Self::Float64(v) => v.append_null(),
            Self::Decimal128(v) => v.append_null(),
            Self::Boolean(v) => v.append_null(),
            Self::Utf8(v) | Self::Binary(v) => v.append_null(),
            Self::Timestamp(v) => v.append_null(),
        }
    }

    fn set_value_count(&mut self, count: usize) {
        match self {
            Self::Int8(v) => v.set_value_count(count),
            Self::Int16(v) => v.set_value_count(count),
            Self::Int32(v) => v.set_value_count(count),
            Self::Int64(v) => v.set_value_count(count),
            Self::Float64(v) => v.set_value_count(count),
            Self::Decimal128(v) => v.set_value_count(count),
            Self::Boolean(v) => v.set_value_count(count),
            Self::Utf8(v) | Self::Binary(v) => v.set_value_count(count),
            Self::Timestamp(v) => v.set_value_count(count),
        }
    }

    fn clear(&mut self) {
        match self {
            Self::Int8(v) => v.clear(),
            Self::Int16(v) => v.clear(),
            Self::Int32(v) => v.clear(),
            Self::Int64(v) => v.clear(),
            Self::Float64(v) => v.clear(),
            Self::Decimal128(v) => v.clear(),
            Self::Boolean(v) => v.clear(),
            Self::Utf8(v) | Self::Binary(v) => v.clear(),
            Self::Timestamp(v) => v.clear(),
        }
    }

    fn fresh(&self) -> Self {
        match self {
            Self::Int8(v) => Self::Int8(v.fresh()),
            Self::Int16(v) => Self::Int16(v.fresh()),
            Self::Int32(v) => Self::Int32(v.fresh()),
            Self::Int64(v) => Self::Int64(v.fresh()),
            Self::Float64(v) => Self::Float64(v.fresh()),
            Self::Decimal128(v) => Self::Decimal128(v.fresh()),
            Self::Boolean(v) => Self::Boolean(v.fresh()),
            Self::Utf8(v) => Self::Utf8(v.fresh()),
            Self::Binary(v) => Self::Binary(v.fresh()),
            Self::Timestamp(v) => Self::Timestamp(v.fresh()),
        }
    }

    /// Name of the layout, for diagnostics.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Int8(_) => "INT8",
            Self::Int16(_) => "INT16",
            Self::Int32(_) => "INT32",
            Self::Int64(_) => "INT64",
            Self::Float64(_) => "FLOAT64",
            Self::Decimal128(_) => "DECIMAL128",
            Self::Boolean(_) => "BOOLEAN",
            Self::Utf8(_) => "UTF8",
            Self::Binary(_) => "BINARY",
            Self::Timestamp(_) => "TIMESTAMP",
        }
    }
}

/// One column's storage plus the encoding metadata that travels with it to
/// the server-side reader.
#[derive(Debug)]
pub struct ColumnVector {
    name: String,
    data: VectorData,
    metadata: HashMap<String, String>,
}

impl ColumnVector {
    pub(crate) fn new(name: String, data: VectorData, metadata: HashMap<String, String>) -> Self {
        Self {
            name,
            data,
            metadata,
        }
    }

    /// Normalized column name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The storage layout.
    #[must_use]
    pub fn data(&self) -> &VectorData {
        &self.data
    }

    pub(crate) fn data_mut(&mut self) -> &mut VectorData {
        &mut self.data
    }

    /// Encoding metadata key-values (`logicalType`, `physicalType`, ...).
    #[must_use]
    pub fn metadata(&self) -> &HashMap<String, String> {
        &self.metadata
    }

    /// Number of rows in the vector.
    #[must_use]
    pub fn value_count(&self) -> usize {
        self.data.len()
    }

    /// Append a null slot.
    pub(crate) fn append_null(&mut self) {
        self.data.append_null();
    }

    /// Force the row count to `count`, padding with nulls or truncating
    /// trailing rows. Called right before transfer so every column hands off
    /// the same number of rows.
    pub(crate) fn set_value_count(&mut self, count: usize) {
        self.data.set_value_count(count);
    }

    /// Move the filled storage out, leaving a fresh empty vector of the same
    /// layout on the same allocator.
    pub(crate) fn transfer(&mut self) -> ColumnVector {
        let fresh = self.data.fresh();
        let filled = std::mem::replace(&mut self.data, fresh);
        ColumnVector {
            name: self.name.clone(),
            data: filled,
            metadata: self.metadata.clone(),
        }
    }

    /// Drop all rows and release the backing storage.
    pub(crate) fn clear(&mut self) {
        self.data.clear();
    }
}
