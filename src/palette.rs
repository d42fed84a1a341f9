use crate::color::Color;

/// The 13 UI roles, in canonical emission order.
pub const UI_ROLES: [&str; 13] = [
    "bg-primary",
    "bg-secondary",
    "bg-tertiary",
    "text-primary",
    "text-secondary",
    "text-tertiary",
    "accent-primary",
    "accent-secondary",
    "error-color",
    "warning-color",
    "success-color",
    "border-active",
    "border-inactive",
];

/// The 16 terminal roles, indexed by ANSI slot.
pub const ANSI_ROLES: [&str; 16] = [
    "ansi-0", "ansi-1", "ansi-2", "ansi-3", "ansi-4", "ansi-5", "ansi-6", "ansi-7", "ansi-8",
    "ansi-9", "ansi-10", "ansi-11", "ansi-12", "ansi-13", "ansi-14", "ansi-15",
];

/// The frozen 29-role palette produced by role assignment.
///
/// Every role is always populated; lookups only fail for names outside the
/// fixed role set. The palette is immutable once built — transformed colors
/// during rendering are derived copies.
#[derive(Debug, Clone)]
pub struct SemanticPalette {
    ui: [Color; 13],
    ansi: [Color; 16],
}

impl SemanticPalette {
    pub fn new(ui: [Color; 13], ansi: [Color; 16]) -> Self {
        Self { ui, ansi }
    }

    /// Look up a role by name (`bg-primary`, `ansi-11`, ...).
    pub fn get(&self, role: &str) -> Option<Color> {
        if let Some(idx) = UI_ROLES.iter().position(|r| *r == role) {
            return Some(self.ui[idx]);
        }
        let slot: usize = role.strip_prefix("ansi-")?.parse().ok()?;
        self.ansi.get(slot).copied()
    }

    /// All 29 roles in canonical order: the UI roles, then ansi-0..15.
    pub fn roles(&self) -> impl Iterator<Item = (&'static str, Color)> + '_ {
        UI_ROLES
            .iter()
            .zip(self.ui.iter())
            .chain(ANSI_ROLES.iter().zip(self.ansi.iter()))
            .map(|(name, color)| (*name, *color))
    }

    /// The 13 UI roles in canonical order (Default render mode).
    pub fn ui_roles(&self) -> impl Iterator<Item = (&'static str, Color)> + '_ {
        UI_ROLES
            .iter()
            .zip(self.ui.iter())
            .map(|(name, color)| (*name, *color))
    }

    pub fn ansi(&self, slot: usize) -> Color {
        self.ansi[slot]
    }
}
