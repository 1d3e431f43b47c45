//! Chunk reassembly

/// Concatenate chunks into one buffer sized to the sum of their lengths
///
/// Each chunk is copied at its cumulative offset, so order is preserved and
/// empty chunks contribute nothing.
pub fn reassemble<B: AsRef<[u8]>>(chunks: &[B]) -> Vec<u8> {
    let total: usize = chunks.iter().map(|c| c.as_ref().len()).sum();
    let mut buffer = vec![0u8; total];

    let mut offset = 0;
    for chunk in chunks {
        let chunk = chunk.as_ref();
        buffer[offset..offset + chunk.len()].copy_from_slice(chunk);
        offset += chunk.len();
    }

    buffer
}
