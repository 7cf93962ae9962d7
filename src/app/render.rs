use crate::config::toml_config::DEFAULT_ROWS_PER_PAGE;
use crate::domain::model::{Cell, Frame};

/// One page of a dataset view.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub name: String,
    pub frame: Frame,
    /// 1-based, already clamped.
    pub page: usize,
    pub pages: usize,
    /// 1-based index of the first row shown.
    pub start: usize,
    pub end: usize,
    pub total: usize,
}

impl Page {
    pub fn caption(&self) -> String {
        if self.total == 0 {
            format!("O DataFrame '{}' está vazio ou não foi carregado.", self.name)
        } else {
            format!("Exibindo linhas {} a {} de {}.", self.start, self.end, self.total)
        }
    }
}

/// Slices `frame` into the requested page. Page numbers outside
/// `[1, pages]` are clamped; a zero page size falls back to the default.
pub fn paginate(frame: &Frame, name: &str, page: usize, rows_per_page: usize) -> Page {
    let per_page = if rows_per_page == 0 {
        DEFAULT_ROWS_PER_PAGE
    } else {
        rows_per_page
    };
    let total = frame.len();

    if total == 0 {
        return Page {
            name: name.to_string(),
            frame: frame.slice(0, 0),
            page: 1,
            pages: 0,
            start: 0,
            end: 0,
            total,
        };
    }

    let pages = (total - 1) / per_page + 1;
    let page = page.clamp(1, pages);
    let offset = (page - 1) * per_page;
    let end = (offset + per_page).min(total);

    Page {
        name: name.to_string(),
        frame: frame.slice(offset, end),
        page,
        pages,
        start: offset + 1,
        end,
        total,
    }
}

fn is_numeric(cell: &Cell) -> bool {
    matches!(cell, Cell::Int(_) | Cell::Float(_))
}

fn display(cell: &Cell) -> String {
    match cell {
        Cell::Null => String::new(),
        Cell::Float(v) => format!("{:.2}", v),
        other => other.to_string(),
    }
}

/// Plain-text table: header, dashed rule, one line per row. Numbers are
/// right-aligned.
pub fn render_table(frame: &Frame) -> String {
    let body: Vec<Vec<String>> = frame
        .rows()
        .iter()
        .map(|row| row.iter().map(display).collect())
        .collect();

    let mut widths: Vec<usize> = frame.columns().iter().map(|c| c.chars().count()).collect();
    for row in &body {
        for (width, text) in widths.iter_mut().zip(row) {
            *width = (*width).max(text.chars().count());
        }
    }

    let mut out = String::new();
    let header: Vec<String> = frame
        .columns()
        .iter()
        .zip(&widths)
        .map(|(c, w)| pad(c, *w, false))
        .collect();
    out.push_str(header.join("  ").trim_end());
    out.push('\n');

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    out.push_str(&rule.join("  "));
    out.push('\n');

    for (cells, texts) in frame.rows().iter().zip(&body) {
        let line: Vec<String> = texts
            .iter()
            .zip(cells)
            .zip(&widths)
            .map(|((text, cell), w)| pad(text, *w, is_numeric(cell)))
            .collect();
        out.push_str(line.join("  ").trim_end());
        out.push('\n');
    }
    out
}

fn pad(text: &str, width: usize, right: bool) -> String {
    let fill = " ".repeat(width.saturating_sub(text.chars().count()));
    if right {
        format!("{}{}", fill, text)
    } else {
        format!("{}{}", text, fill)
    }
}

/// `label: value` lines, labels aligned.
pub fn render_metrics(metrics: &[(&str, String)]) -> String {
    let width = metrics
        .iter()
        .map(|(label, _)| label.chars().count())
        .max()
        .unwrap_or(0);
    metrics
        .iter()
        .map(|(label, value)| format!("{}: {}\n", pad(label, width, false), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered(n: i64) -> Frame {
        Frame::from_rows(["n"], (1..=n).map(|i| vec![Cell::Int(i)]).collect())
    }

    #[test]
    fn test_paginate_middle_and_last_page() {
        let frame = numbered(250);

        let second = paginate(&frame, "df_vendas", 2, 100);
        assert_eq!(second.pages, 3);
        assert_eq!((second.start, second.end), (101, 200));
        assert_eq!(second.frame.get(0, "n"), Some(&Cell::Int(101)));
        assert_eq!(second.caption(), "Exibindo linhas 101 a 200 de 250.");

        let last = paginate(&frame, "df_vendas", 3, 100);
        assert_eq!(last.frame.len(), 50);
        assert_eq!(last.caption(), "Exibindo linhas 201 a 250 de 250.");
    }

    #[test]
    fn test_paginate_clamps_page() {
        let frame = numbered(10);
        assert_eq!(paginate(&frame, "x", 0, 4).page, 1);
        let beyond = paginate(&frame, "x", 99, 4);
        assert_eq!(beyond.page, 3);
        assert_eq!((beyond.start, beyond.end), (9, 10));
    }

    #[test]
    fn test_paginate_exact_multiple() {
        let page = paginate(&numbered(200), "x", 2, 100);
        assert_eq!(page.pages, 2);
        assert_eq!(page.end, 200);
    }

    #[test]
    fn test_empty_frame_caption() {
        let page = paginate(&Frame::new(["a"]), "df_vendas_agrupado", 1, 100);
        assert!(page.frame.is_empty());
        assert_eq!(
            page.caption(),
            "O DataFrame 'df_vendas_agrupado' está vazio ou não foi carregado."
        );
    }

    #[test]
    fn test_render_table_alignment() {
        let frame = Frame::from_rows(
            ["Produto", "Qtd"],
            vec![
                vec![Cell::from("Arroz"), Cell::Float(12.0)],
                vec![Cell::from("Feijão preto"), Cell::Float(3.5)],
                vec![Cell::Null, Cell::Int(1)],
            ],
        );
        let text = render_table(&frame);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Produto       Qtd");
        assert_eq!(lines[1], "------------  -----");
        assert_eq!(lines[2], "Arroz         12.00");
        assert_eq!(lines[3], "Feijão preto   3.50");
        assert_eq!(lines[4], "                  1");
    }

    #[test]
    fn test_render_metrics() {
        let text = render_metrics(&[("Clientes", "3".to_string()), ("Taxa", "50.0%".to_string())]);
        assert_eq!(text, "Clientes: 3\nTaxa    : 50.0%\n");
    }
}
