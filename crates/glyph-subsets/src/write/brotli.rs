//! Brotli compression of the WOFF2 table stream.

use super::FontWriter;
use crate::alloc::{vec, Box, Vec};

/// Reads unpadded table contents back-to-back, in the order of table records.
struct TableStream<'a> {
    tables: Vec<&'a [u8]>,
    table_idx: usize,
    pos: usize,
}

impl<'a> TableStream<'a> {
    fn new(writer: &'a FontWriter) -> Self {
        // Record offsets may already be shifted by the sfnt header length.
        let heap_start = writer.tables.first().map_or(0, |record| record.offset);
        let tables = writer
            .tables
            .iter()
            .map(|record| {
                let start = (record.offset - heap_start) as usize;
                &writer.table_data[start..start + record.length as usize]
            })
            .collect();
        Self {
            tables,
            table_idx: 0,
            pos: 0,
        }
    }
}

impl brotli::CustomRead<()> for TableStream<'_> {
    fn read(&mut self, data: &mut [u8]) -> Result<usize, ()> {
        let mut filled = 0;
        while filled < data.len() {
            let Some(table) = self.tables.get(self.table_idx) else {
                break;
            };
            let chunk = &table[self.pos..];
            let len = chunk.len().min(data.len() - filled);
            data[filled..filled + len].copy_from_slice(&chunk[..len]);
            filled += len;
            self.pos += len;
            if self.pos == table.len() {
                self.table_idx += 1;
                self.pos = 0;
            }
        }
        Ok(filled)
    }
}

#[derive(Default)]
struct VecSink(Vec<u8>);

impl brotli::CustomWrite<()> for VecSink {
    fn write(&mut self, data: &[u8]) -> Result<usize, ()> {
        self.0.extend_from_slice(data);
        Ok(data.len())
    }

    fn flush(&mut self) -> Result<(), ()> {
        Ok(())
    }
}

#[derive(Debug, Clone)]
struct HeapSlice<T>(Box<[T]>);

impl<T> Default for HeapSlice<T> {
    fn default() -> Self {
        Self(Box::default())
    }
}

impl<T> brotli::SliceWrapper<T> for HeapSlice<T> {
    fn slice(&self) -> &[T] {
        &self.0
    }
}

impl<T> brotli::SliceWrapperMut<T> for HeapSlice<T> {
    fn slice_mut(&mut self) -> &mut [T] {
        &mut self.0
    }
}

/// Allocator backed by the global heap.
#[derive(Debug)]
struct HeapAlloc;

impl<T: Clone + Default> brotli::enc::Allocator<T> for HeapAlloc {
    type AllocatedMemory = HeapSlice<T>;

    fn alloc_cell(&mut self, len: usize) -> Self::AllocatedMemory {
        HeapSlice(vec![T::default(); len].into_boxed_slice())
    }

    fn free_cell(&mut self, _data: Self::AllocatedMemory) {}
}

impl brotli::enc::BrotliAlloc for HeapAlloc {}

impl FontWriter {
    /// Size of the input / output buffers used by the encoder.
    const BROTLI_BUFFER_LEN: usize = 4_096;

    pub(super) fn compress_data(&self) -> Vec<u8> {
        let params = ::brotli::enc::BrotliEncoderParams::default();
        let mut sink = VecSink::default();
        ::brotli::BrotliCompressCustomIo(
            &mut TableStream::new(self),
            &mut sink,
            &mut [0_u8; Self::BROTLI_BUFFER_LEN],
            &mut [0_u8; Self::BROTLI_BUFFER_LEN],
            &params,
            HeapAlloc,
            &mut |_, _, _, _| {},
            (),
        )
        .expect("writing to Vec never fails");
        sink.0
    }
}
