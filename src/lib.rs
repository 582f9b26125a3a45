mod docx;
mod error;
mod model;
mod refs;
mod transform;

pub use error::Error;

use std::path::Path;
use std::time::Instant;

/// Reads a DOCX file, applies the APA formatting pass, and writes the result
/// to `output`. `progress` receives a 0-100 percentage once per body
/// paragraph; it is called synchronously and must not block.
///
/// The input file is never modified, and saving is the last step, so a
/// failure never leaves a partial output file behind.
pub fn format_docx(
    input: &Path,
    output: &Path,
    progress: impl FnMut(f32),
) -> Result<(), Error> {
    let t0 = Instant::now();

    let mut doc = docx::parse(input)?;
    let t_parse = t0.elapsed();

    transform::apply(&mut doc, progress);
    let bytes = docx::write(&doc)?;
    let t_format = t0.elapsed();

    std::fs::write(output, &bytes).map_err(Error::Io)?;
    let t_total = t0.elapsed();

    log::info!(
        "Timing: parse={:.1}ms, format={:.1}ms, write={:.1}ms, total={:.1}ms (output {} bytes)",
        t_parse.as_secs_f64() * 1000.0,
        (t_format - t_parse).as_secs_f64() * 1000.0,
        (t_total - t_format).as_secs_f64() * 1000.0,
        t_total.as_secs_f64() * 1000.0,
        bytes.len(),
    );

    Ok(())
}

/// In-memory variant of [`format_docx`]: takes the package bytes, returns the
/// reformatted package bytes.
pub fn format_docx_bytes(input: &[u8], progress: impl FnMut(f32)) -> Result<Vec<u8>, Error> {
    let mut doc = docx::parse_bytes(input.to_vec())?;
    transform::apply(&mut doc, progress);
    docx::write(&doc)
}
