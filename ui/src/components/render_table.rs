use geom::Polygon;
use widgetry::{Color, ControlState, EventCtx, GeomBatch, Text, TextExt, Widget};

/// Each row is a button named by its label, with one cell per header
pub fn render_table(
    ctx: &mut EventCtx,
    headers: Vec<Widget>,
    rows: Vec<(String, Vec<GeomBatch>)>,
    total_width: f64,
    min_extra_margin: f64,
) -> Widget {
    let mut width_per_col: Vec<f64> = headers.iter().map(|w| w.get_width_for_forcing()).collect();
    for (_, row) in &rows {
        for (col, width) in row.iter().zip(width_per_col.iter_mut()) {
            *width = width.max(col.get_dims().width);
        }
    }

    let actual_total_width = width_per_col.iter().sum::<f64>();
    let gaps = width_per_col.len().saturating_sub(1).max(1) as f64;
    let extra_margin = ((total_width - actual_total_width) / gaps).max(min_extra_margin);

    let last = width_per_col.len().saturating_sub(1);
    let mut col = vec![Widget::custom_row(
        headers
            .into_iter()
            .enumerate()
            .map(|(idx, w)| {
                let margin = extra_margin + width_per_col[idx] - w.get_width_for_forcing();
                if idx == last {
                    w.margin_right((margin - extra_margin) as usize)
                } else {
                    w.margin_right(margin as usize)
                }
            })
            .collect(),
    )];

    for (label, row) in rows {
        let mut batch = GeomBatch::new();
        batch.autocrop_dims = false;
        let mut x1 = 0.0;
        for (cell, width) in row.into_iter().zip(width_per_col.iter()) {
            batch.append(cell.translate(x1, 0.0));
            x1 += *width + extra_margin;
        }

        let rect = Polygon::rectangle(total_width.max(x1), batch.get_dims().height);
        let mut hovered = GeomBatch::new();
        hovered.push(Color::hex("#CFD8DC"), rect);
        hovered.append(batch.clone());

        col.push(
            ctx.style()
                .btn_plain
                .btn()
                .custom_batch(batch, ControlState::Default)
                .custom_batch(hovered, ControlState::Hovered)
                .no_tooltip()
                .build_widget(ctx, &label),
        );
    }

    Widget::custom_col(col)
}

/// A table of text cells, sized to part of the window
pub fn txt_table(
    ctx: &mut EventCtx,
    headers: Vec<&str>,
    rows: Vec<(String, Vec<Text>)>,
    width_pct: f64,
) -> Widget {
    let mut rendered_rows = Vec::new();
    for (label, row) in rows {
        rendered_rows.push((
            label,
            row.into_iter()
                .map(|txt| {
                    let (entry, _) = txt
                        .render_autocropped(ctx)
                        .batch()
                        .container()
                        .padding(8.0)
                        .into_geom(ctx, None);
                    entry
                })
                .collect(),
        ));
    }

    render_table(
        ctx,
        headers.into_iter().map(|x| x.text_widget(ctx)).collect(),
        rendered_rows,
        width_pct * ctx.canvas.window_width,
        10.0,
    )
}
