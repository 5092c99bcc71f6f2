//! Sample makefile emission
//!
//! Builds the generated source into one shared object per preset
//! combination of the compile-time switches (colors, timestamps, threads,
//! indentation), so the caller can pick a variant with `LD_PRELOAD` without
//! editing build flags.

use std::path::Path;

use super::GenContext;

/// Render the makefile text. When `makefile` and `source` live in different
/// directories the rules fall back to absolute paths; the caller is warned
/// through the returned flag.
pub fn render(makefile: &Path, source: &Path, ctx: &GenContext) -> (String, bool) {
    let same_dir = makefile.parent() == source.parent();
    let (source_file, makefile_ref) = if same_dir {
        (
            file_name(source),
            file_name(makefile),
        )
    } else {
        (
            source.to_string_lossy().into_owned(),
            makefile.to_string_lossy().into_owned(),
        )
    };
    let source_name = source
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| source_file.clone());

    let text = TEMPLATE
        .replace("{prefix}", &ctx.prefix)
        .replace("{sourcefile}", &source_file)
        .replace("{sourcename}", &source_name)
        .replace("{makefile}", &makefile_ref);
    (text, same_dir)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

const TEMPLATE: &str = "\
CFLAGS = -Wall -Wextra
LDFLAGS = -ldl -fPIC

BINS = \\
    {sourcename}.so \\
    {sourcename}-color.so \\
    {sourcename}-color-timestamp.so \\
    {sourcename}-color-threads.so \\
    {sourcename}-color-threads-timestamp.so \\
    {sourcename}-color-indent.so \\
    {sourcename}-color-indent-timestamp.so \\
    {sourcename}-color-indent-threads.so \\
    {sourcename}-color-indent-threads-timestamp.so

.PHONY: all clean
all: $(BINS)
clean:
\trm -f $(BINS) *~

{sourcename}.so: {sourcefile} {makefile}
\t$(CC) -shared $(CFLAGS) $(LDFLAGS) $< -o $@

{sourcename}-color.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 $(CFLAGS) $(LDFLAGS) $< -o $@

{sourcename}-color-timestamp.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_LOG_TIMESTAMP=1 $(CFLAGS) $(LDFLAGS) $< -o $@

{sourcename}-color-threads.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_HAVE_THREADS=1 $(CFLAGS) $(LDFLAGS) -lpthread $< -o $@

{sourcename}-color-threads-timestamp.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_HAVE_THREADS=1 -D{prefix}_LOG_TIMESTAMP=1 $(CFLAGS) $(LDFLAGS) -lpthread $< -o $@

{sourcename}-color-indent.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_LOG_INDENT='\"  \"' $(CFLAGS) $(LDFLAGS) $< -o $@

{sourcename}-color-indent-timestamp.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_LOG_INDENT='\"  \"' -D{prefix}_LOG_TIMESTAMP=1 $(CFLAGS) $(LDFLAGS) $< -o $@

{sourcename}-color-indent-threads.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_LOG_INDENT='\"  \"' -D{prefix}_HAVE_THREADS=1 $(CFLAGS) $(LDFLAGS) -lpthread $< -o $@

{sourcename}-color-indent-threads-timestamp.so: {sourcefile} {makefile}
\t$(CC) -shared -D{prefix}_USE_COLORS=1 -D{prefix}_LOG_INDENT='\"  \"' -D{prefix}_HAVE_THREADS=1 -D{prefix}_LOG_TIMESTAMP=1 $(CFLAGS) $(LDFLAGS) -lpthread $< -o $@
";
