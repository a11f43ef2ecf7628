//! Incident chronology normalisation.
//!
//! Reporters type chronologies quickly, one event per line. Stored chronologies are tidied
//! so every line is trimmed, starts with a capital letter and ends with a full stop, and blank
//! lines are dropped. Formatting is idempotent.

/// Normalises a chronology narrative.
pub fn format(text: &str) -> String {
    text.split(['\n', '\r'])
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(format_line)
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_line(line: &str) -> String {
    let mut chars = line.chars();
    let mut out = String::with_capacity(line.len() + 1);

    if let Some(first) = chars.next() {
        out.extend(first.to_uppercase());
        out.push_str(chars.as_str());
    }

    if !out.ends_with('.') {
        out.push('.');
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capitalises_and_terminates_each_line() {
        assert_eq!(
            format("first step\nsecond step"),
            "First step.\nSecond step."
        );
    }

    #[test]
    fn drops_blank_lines_and_trims() {
        assert_eq!(
            format("  pasien jatuh  \r\n\r\n\t\n perawat datang."),
            "Pasien jatuh.\nPerawat datang."
        );
    }

    #[test]
    fn empty_input_formats_to_empty() {
        assert_eq!(format(""), "");
        assert_eq!(format("\n \n\r"), "");
    }

    #[test]
    fn keeps_existing_period() {
        assert_eq!(format("Sudah dilaporkan."), "Sudah dilaporkan.");
    }

    #[test]
    fn format_is_idempotent() {
        let samples = [
            "",
            "a",
            ".",
            "first step\nsecond step",
            "  x  \n\n  y.  \r\nz",
            "ßtraße\nélan",
            "jam 10.00 pasien mengeluh nyeri\r\njam 10.15 dokter jaga datang\rtindakan selesai.",
            "?\n!\n...",
            "1. cek identitas\n2. beri obat",
        ];
        for sample in samples {
            let once = format(sample);
            assert_eq!(format(&once), once, "not idempotent for {sample:?}");
        }
    }
}
