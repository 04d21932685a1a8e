//! Output formatting for CLI

use crate::q_learning::{CellKind, GreedyPath, GridWorld, Shade, ValueSnapshot};

/// Print a section header
pub fn print_section(title: &str) {
    println!("\n{}", "=".repeat(60));
    println!("{title}");
    println!("{}", "=".repeat(60));
}

/// Print a subsection header
pub fn print_subsection(title: &str) {
    println!("\n{title}");
    println!("{}", "-".repeat(40));
}

/// Format a number with thousands separators
pub fn format_number(n: usize) -> String {
    let s = n.to_string();
    let mut result = String::new();
    for (i, c) in s.chars().rev().enumerate() {
        if i > 0 && i.is_multiple_of(3) {
            result.insert(0, ',');
        }
        result.insert(0, c);
    }
    result
}

/// Print a key-value pair
pub fn print_kv(key: &str, value: &str) {
    println!("  {:20} {}", format!("{}:", key), value);
}

/// Print statistics table
pub fn print_stats_table(stats: &[(&str, String)]) {
    for (key, value) in stats {
        print_kv(key, value);
    }
}

fn intensity(opacity: f64) -> char {
    match opacity {
        o if o >= 0.6 => '█',
        o if o >= 0.4 => '▓',
        o if o >= 0.2 => '▒',
        _ => '░',
    }
}

/// Render a value snapshot as a text grid.
///
/// Goal and hazard cells show a bracketed glyph. Other cells show the value,
/// a sign for the shade and a block whose density follows the opacity.
pub fn format_heatmap(snapshot: &ValueSnapshot) -> String {
    let mut out = String::new();
    for (index, heat) in snapshot.heatmap().iter().enumerate() {
        if index > 0 && index % snapshot.width() == 0 {
            out.push('\n');
        }
        let cell = match heat.shade {
            Shade::Goal => format!("{:>9}", "[Z]"),
            Shade::Hazard => format!("{:>9}", "[F]"),
            Shade::Positive => format!("{:>7.1}+{}", heat.value, intensity(heat.opacity)),
            Shade::Negative => format!("{:>7.1}-{}", heat.value, intensity(heat.opacity)),
        };
        out.push(' ');
        out.push_str(&cell);
    }
    out.push('\n');
    out
}

/// Render the grid with the greedy path drawn as arrows.
pub fn format_path(grid: &GridWorld, path: &GreedyPath) -> String {
    let mut glyphs: Vec<char> = grid.cells().map(|(_, kind)| kind.glyph()).collect();
    for (cell, action) in path.cells.iter().zip(&path.actions) {
        if grid.kind(*cell) != Some(CellKind::Goal) {
            glyphs[cell.row * grid.width() + cell.col] = action.arrow();
        }
    }

    glyphs
        .chunks(grid.width())
        .map(|row| {
            let mut line: String = row.iter().flat_map(|&glyph| [' ', glyph]).collect();
            line.push('\n');
            line
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::q_learning::{Action, QTable, Rewards};

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(5), "5");
        assert_eq!(format_number(5000), "5,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn path_is_drawn_with_arrows() {
        let grid = GridWorld::parse("S.Z").unwrap();
        let mut q_table = QTable::new(grid.num_states(), 0.1, 0.9);
        q_table.set(0, Action::Right, 1.0);
        q_table.set(1, Action::Right, 1.0);
        let path = GreedyPath::follow(&grid, &q_table, 25);
        assert_eq!(format_path(&grid, &path), " → → Z\n");
    }

    #[test]
    fn heatmap_has_one_line_per_row() {
        let grid = GridWorld::parse("S.F/..Z").unwrap();
        let q_table = QTable::new(grid.num_states(), 0.1, 0.9);
        let snapshot = ValueSnapshot::capture(&grid, &q_table, &Rewards::default());
        let text = format_heatmap(&snapshot);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[F]"));
        assert!(lines[1].ends_with("[Z]"));
    }

    #[test]
    fn heatmap_cells_are_space_separated_and_aligned() {
        let grid = GridWorld::parse("S.F/..Z").unwrap();
        let q_table = QTable::new(grid.num_states(), 0.1, 0.9);
        let snapshot = ValueSnapshot::capture(&grid, &q_table, &Rewards::default());
        let text = format_heatmap(&snapshot);
        for line in text.lines() {
            assert_eq!(line.chars().count(), 3 * 10);
            assert_eq!(line.split_whitespace().count(), 3);
        }
        assert!(text.starts_with("     0.0"));
    }
}
