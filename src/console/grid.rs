/// Renders rows as a bordered text grid:
///
/// ```text
/// +------+---------+
/// | id   | country |
/// +======+=========+
/// |    1 | USA     |
/// +------+---------+
/// ```
///
/// Numeric cells are right-aligned, everything else left-aligned.
pub fn render_grid<H, C>(headers: &[H], rows: &[Vec<C>]) -> String
where
    H: AsRef<str>,
    C: AsRef<str>,
{
    let column_count = rows
        .iter()
        .map(Vec::len)
        .chain(std::iter::once(headers.len()))
        .max()
        .unwrap_or(0);

    let mut widths = vec![0usize; column_count];
    for (index, header) in headers.iter().enumerate() {
        widths[index] = widths[index].max(display_width(header.as_ref()));
    }
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            widths[index] = widths[index].max(display_width(cell.as_ref()));
        }
    }

    let mut out = String::new();
    push_border(&mut out, &widths, '-');

    let header_cells: Vec<&str> = headers.iter().map(AsRef::as_ref).collect();
    push_row(&mut out, &widths, &header_cells, false);
    push_border(&mut out, &widths, '=');

    for row in rows {
        let cells: Vec<&str> = row.iter().map(AsRef::as_ref).collect();
        push_row(&mut out, &widths, &cells, true);
        push_border(&mut out, &widths, '-');
    }

    if out.ends_with('\n') {
        out.pop();
    }
    out
}

fn push_border(out: &mut String, widths: &[usize], fill: char) {
    out.push('+');
    for width in widths {
        out.extend(std::iter::repeat_n(fill, width + 2));
        out.push('+');
    }
    out.push('\n');
}

fn push_row(out: &mut String, widths: &[usize], cells: &[&str], align_numbers: bool) {
    out.push('|');
    for (index, width) in widths.iter().enumerate() {
        let cell = cells.get(index).copied().unwrap_or("");
        let padding = width - display_width(cell);
        out.push(' ');
        if align_numbers && is_numeric(cell) {
            out.extend(std::iter::repeat_n(' ', padding));
            out.push_str(cell);
        } else {
            out.push_str(cell);
            out.extend(std::iter::repeat_n(' ', padding));
        }
        out.push_str(" |");
    }
    out.push('\n');
}

fn display_width(text: &str) -> usize {
    text.chars().count()
}

fn is_numeric(cell: &str) -> bool {
    !cell.is_empty() && cell.parse::<f64>().is_ok()
}
