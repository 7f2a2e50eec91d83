//! Statement chunking
//!
//! Partitions a statement PDF into contiguous fixed-size page groups and
//! materializes each group as an independent, self-contained PDF. Page
//! content is copied at the object level, so the split never re-renders or
//! recompresses page streams.

use lopdf::Document;

use super::types::{ChunkArtifact, PageRange, SplitError};

/// Compute the contiguous page ranges a document splits into.
///
/// Ranges are half-open over zero-based page indices and cover
/// `[0, total_pages)` in order. All ranges but the last hold exactly
/// `chunk_size` pages; the last holds the remainder. A `chunk_size` of
/// zero yields no ranges.
pub fn page_ranges(total_pages: usize, chunk_size: usize) -> Vec<PageRange> {
    if chunk_size == 0 || total_pages == 0 {
        return Vec::new();
    }

    let total_chunks = total_pages.div_ceil(chunk_size);
    (0..total_chunks)
        .map(|i| {
            let start = i * chunk_size;
            let end = usize::min(start + chunk_size, total_pages);
            PageRange { start, end }
        })
        .collect()
}

/// Derive a chunk file name from the source file name.
///
/// `statement.pdf` becomes `statement_chunk_3.pdf`; a source name without
/// a trailing `.pdf` keeps its full name as the stem.
pub fn chunk_file_name(original: &str, ordinal: usize) -> String {
    let stem = original.strip_suffix(".pdf").unwrap_or(original);
    format!("{}_chunk_{}.pdf", stem, ordinal)
}

/// Split a statement PDF into fixed-size page chunks.
///
/// Every returned artifact is an independently openable PDF holding
/// exactly the pages of its range, in source order. A zero-page document
/// yields an empty list, which is not an error. Page assignment is fully
/// determined by the page count and `chunk_size`.
pub fn split_document(
    file_name: &str,
    bytes: &[u8],
    chunk_size: usize,
) -> Result<Vec<ChunkArtifact>, SplitError> {
    if chunk_size == 0 {
        return Err(SplitError::InvalidChunkSize);
    }

    let source = Document::load_mem(bytes)?;
    let page_numbers: Vec<u32> = source.get_pages().keys().copied().collect();
    let total_pages = page_numbers.len();
    let ranges = page_ranges(total_pages, chunk_size);

    tracing::info!(
        file_name = %file_name,
        total_pages,
        total_chunks = ranges.len(),
        "Splitting statement PDF into chunks"
    );

    let mut artifacts = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        let ordinal = index + 1;
        let chunk_bytes = extract_range(&source, &page_numbers, range, ordinal)?;
        tracing::debug!(ordinal, bytes = chunk_bytes.len(), "Chunk created");

        artifacts.push(ChunkArtifact {
            ordinal,
            range,
            file_name: chunk_file_name(file_name, ordinal),
            bytes: chunk_bytes,
        });
    }

    Ok(artifacts)
}

/// Copy one page range out of the source into a fresh serialized document.
///
/// Works on a clone of the source: pages outside the range are deleted and
/// unreferenced objects pruned, leaving the kept pages byte-identical at
/// the content-stream level. The source itself is never mutated.
fn extract_range(
    source: &Document,
    page_numbers: &[u32],
    range: PageRange,
    ordinal: usize,
) -> Result<Vec<u8>, SplitError> {
    let discard: Vec<u32> = page_numbers
        .iter()
        .enumerate()
        .filter(|(position, _)| *position < range.start || *position >= range.end)
        .map(|(_, number)| *number)
        .collect();

    let mut chunk = source.clone();
    chunk.delete_pages(&discard);
    chunk.prune_objects();
    chunk.renumber_objects();
    chunk.compress();

    let mut buffer = Vec::new();
    chunk
        .save_to(&mut buffer)
        .map_err(|source| SplitError::Serialize { ordinal, source: lopdf::Error::IO(source) })?;

    Ok(buffer)
}

/// Build a small in-memory PDF with one labelled page per page count.
/// Follows the standard lopdf document construction sequence.
#[cfg(test)]
pub(crate) fn sample_pdf(page_count: usize) -> Vec<u8> {
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Object, Stream};

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => font_id },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(page_count);
    for number in 1..=page_count {
        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![72.into(), 720.into()]),
                Operation::new("Tj", vec![Object::string_literal(format!("Page {}", number))]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut buffer = Vec::new();
    doc.save_to(&mut buffer).unwrap();
    buffer
}
