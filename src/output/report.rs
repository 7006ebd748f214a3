use crate::view::{CardView, GalleryView, ImageView, SectionView, ViewBody, ViewTree, VIEW_CERTIFICATE_LABEL};

fn escape_html(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn placeholder_html(glyph: &str) -> String {
    format!(
        r#"<i class="bi {} card-image-placeholder"></i>"#,
        escape_html(glyph)
    )
}

fn render_card(card: &CardView) -> String {
    let image = match &card.image {
        ImageView::Image { src, alt } => format!(
            r#"<img src="{src}" alt="{alt}" loading="lazy" onload="this.classList.add('loaded')" onerror="this.parentElement.innerHTML=this.parentElement.dataset.placeholder">"#,
            src = escape_html(src),
            alt = escape_html(alt),
        ),
        ImageView::Placeholder { glyph } => placeholder_html(glyph),
    };
    let placeholder = escape_html(&placeholder_html(crate::view::PLACEHOLDER_GLYPH));

    format!(
        r#"        <a class="certificate-card" href="{link}" target="_blank" rel="noopener" data-date="{date_key}" data-institution="{institution}" data-institution-rank="{institution_rank}" data-title="{title}" data-title-rank="{title_rank}">
          <div class="card-image-container" data-placeholder="{placeholder}">{image}</div>
          <div class="card-body">
            <h5 class="card-title">{title}</h5>
            <p class="card-institution"><i class="bi bi-building"></i> {institution}</p>
            <p class="card-date"><i class="bi bi-calendar3"></i> {date}</p>
          </div>
          <div class="card-footer-custom"><span class="view-pdf-btn">{view_label} <i class="bi bi-arrow-right"></i></span></div>
        </a>
"#,
        link = escape_html(&card.link),
        placeholder = placeholder,
        image = image,
        title = escape_html(&card.title),
        institution = escape_html(&card.institution),
        date = escape_html(&card.date_label),
        view_label = VIEW_CERTIFICATE_LABEL,
        date_key = card
            .sort_keys
            .date
            .map(|ms| ms.to_string())
            .unwrap_or_default(),
        institution_rank = card.sort_keys.institution,
        title_rank = card.sort_keys.title,
    )
}

fn render_section(section: &SectionView) -> String {
    let cards: String = section.cards.iter().map(render_card).collect();
    format!(
        r#"    <details class="accordion-item" id="{id}"{open}>
      <summary class="accordion-button"><i class="bi bi-folder-fill me-2"></i>{name}<span class="category-badge">{count}</span></summary>
      <div class="certificates-grid">
{cards}      </div>
    </details>
"#,
        id = escape_html(&section.id),
        open = if section.open { " open" } else { "" },
        name = escape_html(&section.name),
        count = section.count,
        cards = cards,
    )
}

fn render_gallery(gallery: &GalleryView) -> String {
    let controls: String = gallery
        .sort_controls
        .iter()
        .map(|c| {
            format!(
                r#"<button type="button" class="sort-control{active}" data-sort="{key}" aria-pressed="{pressed}">{label}</button>"#,
                active = if c.active { " active" } else { "" },
                key = c.key.as_str(),
                pressed = c.active,
                label = escape_html(&c.label),
            )
        })
        .collect();
    let sections: String = gallery.sections.iter().map(render_section).collect();

    format!(
        r#"  <div class="toolbar">
    <span class="total">Total: <strong id="totalCounter">{total}</strong></span>
    <div class="sort-controls">{controls}</div>
    <button id="toggleAllBtn" type="button" data-expanded="{expanded}">{toggle}</button>
  </div>
  <div id="certificatesAccordion">
{sections}  </div>
"#,
        total = gallery.total,
        controls = controls,
        expanded = gallery.all_expanded,
        toggle = escape_html(&gallery.toggle_label),
        sections = sections,
    )
}

fn render_body(body: &ViewBody) -> String {
    match body {
        ViewBody::Loading => {
            r#"  <div id="loadingSpinner" class="spinner" role="status">Cargando...</div>
"#
            .to_string()
        }
        ViewBody::Error { message } => format!(
            r#"  <div class="alert alert-danger" role="alert"><i class="bi bi-exclamation-triangle-fill me-2"></i>{}</div>
"#,
            escape_html(message)
        ),
        ViewBody::Empty { message } => format!(
            r#"  <div id="emptyState" class="empty-state"><i class="bi bi-inbox"></i><p>{}</p></div>
"#,
            escape_html(message)
        ),
        ViewBody::Gallery(gallery) => render_gallery(gallery),
    }
}

pub fn render_html(view: &ViewTree) -> Vec<u8> {
    let html = format!(
        r####"<!DOCTYPE html>
<html lang="es" data-theme="{theme}">
<head>
  <meta charset="utf-8"/>
  <meta content="width=device-width, initial-scale=1.0" name="viewport"/>
  <title>Mis Certificados</title>
  <link href="https://cdn.jsdelivr.net/npm/bootstrap-icons@1.11.3/font/bootstrap-icons.min.css" rel="stylesheet"/>
  <style>
    :root {{ --bg: #f8fafc; --fg: #0f172a; --card: #ffffff; --muted: #64748b; --accent: #135bec; }}
    [data-theme="dark"] {{ --bg: #0f172a; --fg: #f1f5f9; --card: #1e293b; --muted: #94a3b8; }}
    body {{ background: var(--bg); color: var(--fg); font-family: Inter, sans-serif; margin: 0; padding: 2rem; }}
    header {{ display: flex; justify-content: space-between; align-items: center; margin-bottom: 1.5rem; }}
    .toolbar {{ display: flex; flex-wrap: wrap; gap: 1rem; align-items: center; margin-bottom: 1rem; }}
    .sort-control {{ padding: .35rem .8rem; border: 1px solid var(--accent); border-radius: .375rem; margin-right: .25rem; background: transparent; color: inherit; cursor: pointer; }}
    .sort-control.active {{ background: var(--accent); color: #fff; }}
    .accordion-item {{ background: var(--card); border-radius: .75rem; margin-bottom: .75rem; padding: .5rem 1rem; }}
    .accordion-button {{ cursor: pointer; font-weight: 700; padding: .5rem 0; }}
    .category-badge {{ background: var(--accent); color: #fff; border-radius: 9999px; padding: 0 .6rem; margin-left: .5rem; font-size: .8rem; }}
    .certificates-grid {{ display: grid; grid-template-columns: repeat(auto-fill, minmax(260px, 1fr)); gap: 1rem; padding: 1rem 0; }}
    .certificate-card {{ display: block; color: inherit; text-decoration: none; border: 1px solid var(--muted); border-radius: .75rem; overflow: hidden; }}
    .card-image-container {{ height: 160px; display: flex; align-items: center; justify-content: center; background: var(--bg); }}
    .card-image-container img {{ max-width: 100%; max-height: 100%; opacity: 0; transition: opacity .3s; }}
    .card-image-container img.loaded {{ opacity: 1; }}
    .card-image-placeholder {{ font-size: 3rem; color: var(--muted); }}
    .card-body {{ padding: .75rem 1rem; }}
    .card-institution, .card-date {{ color: var(--muted); margin: .25rem 0; }}
    .card-footer-custom {{ padding: .5rem 1rem; color: var(--accent); }}
    .alert-danger {{ background: #fee2e2; color: #991b1b; padding: 1rem; border-radius: .5rem; }}
    .empty-state {{ text-align: center; color: var(--muted); padding: 3rem; }}
  </style>
</head>
<body>
  <header>
    <h1>Mis Certificados</h1>
    <label class="theme-switch"><input type="checkbox" id="darkModeToggle"{checked}/> <i class="bi bi-moon-stars"></i></label>
  </header>
{body}  <script>
    (function() {{
      var root = document.documentElement;
      var toggle = document.getElementById('darkModeToggle');
      var rendered = root.getAttribute('data-theme');
      var saved = null;
      var savedAgainst = null;
      try {{
        saved = localStorage.getItem('theme');
        savedAgainst = localStorage.getItem('themeRendered');
      }} catch (e) {{}}
      // A stored choice only applies to the rendering it was made on.
      if ((saved === 'dark' || saved === 'light') && savedAgainst === rendered) {{
        root.setAttribute('data-theme', saved);
        toggle.checked = saved === 'dark';
      }} else {{
        try {{
          localStorage.setItem('theme', rendered);
          localStorage.setItem('themeRendered', rendered);
        }} catch (e) {{}}
      }}
      toggle.addEventListener('change', function(event) {{
        var theme = event.target.checked ? 'dark' : 'light';
        root.setAttribute('data-theme', theme);
        try {{
          localStorage.setItem('theme', theme);
          localStorage.setItem('themeRendered', rendered);
        }} catch (e) {{}}
      }});

      function sortValue(card, key) {{
        if (key === 'date') {{
          return card.dataset.date === '' ? null : Number(card.dataset.date);
        }}
        return Number(card.dataset[key + 'Rank']);
      }}
      function compareCards(key) {{
        return function(a, b) {{
          var va = sortValue(a, key);
          var vb = sortValue(b, key);
          if (key !== 'date') return va - vb;
          if (va === vb) return 0;
          if (va === null) return 1;
          if (vb === null) return -1;
          return vb - va;
        }};
      }}
      var sortButtons = document.querySelectorAll('.sort-control');
      sortButtons.forEach(function(button) {{
        button.addEventListener('click', function() {{
          if (button.classList.contains('active')) return;
          var key = button.getAttribute('data-sort');
          sortButtons.forEach(function(other) {{
            var on = other === button;
            other.classList.toggle('active', on);
            other.setAttribute('aria-pressed', String(on));
          }});
          document.querySelectorAll('.certificates-grid').forEach(function(grid) {{
            Array.prototype.slice.call(grid.children)
              .sort(compareCards(key))
              .forEach(function(card) {{ grid.appendChild(card); }});
          }});
        }});
      }});

      var toggleAll = document.getElementById('toggleAllBtn');
      if (!toggleAll) return;
      toggleAll.addEventListener('click', function() {{
        var expanded = toggleAll.getAttribute('data-expanded') !== 'true';
        var sections = document.querySelectorAll('#certificatesAccordion details');
        sections.forEach(function(section, index) {{
          section.open = expanded || index === 0;
        }});
        toggleAll.setAttribute('data-expanded', String(expanded));
        toggleAll.textContent = expanded ? 'Contraer Todos' : 'Ver Todos';
      }});
    }})();
  </script>
</body>
</html>
"####,
        theme = view.theme.as_str(),
        checked = if view.theme == crate::prefs::Theme::Dark {
            " checked"
        } else {
            ""
        },
        body = render_body(&view.body),
    );

    html.into_bytes()
}
