//! Detail screen body: the record, its status, and its notes.

use crate::ui::helpers::{stars, truncate};
use crate::ui::theme::Theme;
use crate::ui::viewmodel::DetailViewModel;

/// Lines between the header and the footer.
#[must_use]
pub fn render_detail_body(vm: &DetailViewModel, theme: &Theme, cols: usize) -> Vec<String> {
    let label = |name: &str, value: &str| {
        format!(
            "{}{:<12}{}{}{}",
            Theme::fg(&theme.colors.text_secondary),
            name,
            Theme::fg(&theme.colors.text_primary),
            truncate(value, cols.saturating_sub(12)),
            Theme::reset()
        )
    };
    let error_line = |message: &str| format!("{}{}{}", Theme::fg(&theme.colors.error), truncate(message, cols), Theme::reset());

    let mut lines = Vec::new();

    if let Some(error) = &vm.error {
        lines.push(error_line(error));
    }

    if vm.missing {
        lines.push(error_line("Livre introuvable."));
        return lines;
    }

    match &vm.book {
        None if vm.loading => lines.push(format!("{}Chargement...{}", Theme::fg(&theme.colors.text_secondary), Theme::reset())),
        None => {}
        Some(book) => {
            lines.push(label("Titre", &book.name));
            lines.push(label("Auteur", &book.author));
            lines.push(label("Éditeur", &book.editor));
            lines.push(label("Thème", &book.theme));
            lines.push(label("Année", &book.year.to_string()));
            lines.push(format!(
                "{}{:<12}{}{}{}",
                Theme::fg(&theme.colors.text_secondary),
                "Note",
                Theme::fg(&theme.colors.rating),
                stars(book.stars),
                Theme::reset()
            ));

            let on = Theme::fg(&theme.colors.secondary);
            let off = Theme::fg(&theme.colors.text_secondary);
            lines.push(format!(
                "{}{}  {}{}{}{}",
                if book.read { &on } else { &off },
                if book.read { "✓ Lu" } else { "· Non lu" },
                if book.favorite { &on } else { &off },
                if book.favorite { "♥ Favori" } else { "♡ Favori" },
                if book.pending { "  …" } else { "" },
                Theme::reset()
            ));
            if let Some(cover) = &book.cover {
                lines.push(label("Couverture", cover));
            }
        }
    }

    lines.push(String::new());
    lines.push(format!("{}Notes :{}", Theme::bold(), Theme::reset()));
    if let Some(error) = &vm.notes_error {
        lines.push(error_line(error));
    }
    if vm.notes_loading {
        lines.push(format!("{}Chargement...{}", Theme::fg(&theme.colors.text_secondary), Theme::reset()));
    } else if vm.notes.is_empty() {
        lines.push(format!("{}Aucune note pour ce livre{}", Theme::fg(&theme.colors.text_secondary), Theme::reset()));
    }
    for note in &vm.notes {
        let date = if note.date.is_empty() { "          ".to_string() } else { note.date.clone() };
        lines.push(format!(
            "{}{date}{}  {}",
            Theme::fg(&theme.colors.text_secondary),
            Theme::reset(),
            truncate(&note.content, cols.saturating_sub(12))
        ));
    }

    lines
}
