//! Visibility state for the game's three UI panels.
//!
//! Layout and rendering are the host's concern; the session only decides
//! which panel is on screen.

/// The three panels a play session toggles between.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PanelId {
    /// Restart/resume buttons, shown while paused.
    MainMenu,
    /// Up/down/menu buttons, shown during play.
    GameplayHud,
    /// The "you win!" screen.
    GameOver,
}

/// Tracks which panels are visible. Everything starts hidden; the first
/// session reset establishes the gameplay configuration.
#[derive(Clone, Copy, Debug, Default)]
pub struct MenuPanels {
    main_menu: bool,
    gameplay_hud: bool,
    game_over: bool,
}

impl MenuPanels {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn show(&mut self, panel: PanelId) {
        *self.flag_mut(panel) = true;
    }

    pub fn hide(&mut self, panel: PanelId) {
        *self.flag_mut(panel) = false;
    }

    pub fn is_visible(&self, panel: PanelId) -> bool {
        match panel {
            PanelId::MainMenu => self.main_menu,
            PanelId::GameplayHud => self.gameplay_hud,
            PanelId::GameOver => self.game_over,
        }
    }

    fn flag_mut(&mut self, panel: PanelId) -> &mut bool {
        match panel {
            PanelId::MainMenu => &mut self.main_menu,
            PanelId::GameplayHud => &mut self.gameplay_hud,
            PanelId::GameOver => &mut self.game_over,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn panels_start_hidden_and_toggle_independently() {
        let mut panels = MenuPanels::new();
        assert!(!panels.is_visible(PanelId::MainMenu));
        assert!(!panels.is_visible(PanelId::GameplayHud));
        assert!(!panels.is_visible(PanelId::GameOver));

        panels.show(PanelId::GameplayHud);
        panels.show(PanelId::GameOver);
        panels.hide(PanelId::GameOver);

        assert!(panels.is_visible(PanelId::GameplayHud));
        assert!(!panels.is_visible(PanelId::GameOver));
    }
}
