use super::config::PanelConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PanelId {
    Assistant,
    Guide,
    Settings,
    Pricing,
    Admin,
}

impl PanelId {
    pub const ALL: [PanelId; 5] = [
        PanelId::Assistant,
        PanelId::Guide,
        PanelId::Settings,
        PanelId::Pricing,
        PanelId::Admin,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Self::Assistant => "assistant",
            Self::Guide => "guide",
            Self::Settings => "settings",
            Self::Pricing => "pricing",
            Self::Admin => "admin",
        }
    }
}

/// One independent open flag per overlay panel. Any combination may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PanelState {
    pub assistant: bool,
    pub guide: bool,
    pub settings: bool,
    pub pricing: bool,
    pub admin: bool,
}

impl PanelState {
    pub fn from_config(config: &PanelConfig) -> Self {
        Self {
            guide: config.guide_open_by_default,
            ..Self::default()
        }
    }

    pub fn is_open(&self, panel: PanelId) -> bool {
        match panel {
            PanelId::Assistant => self.assistant,
            PanelId::Guide => self.guide,
            PanelId::Settings => self.settings,
            PanelId::Pricing => self.pricing,
            PanelId::Admin => self.admin,
        }
    }

    fn flag_mut(&mut self, panel: PanelId) -> &mut bool {
        match panel {
            PanelId::Assistant => &mut self.assistant,
            PanelId::Guide => &mut self.guide,
            PanelId::Settings => &mut self.settings,
            PanelId::Pricing => &mut self.pricing,
            PanelId::Admin => &mut self.admin,
        }
    }

    pub fn open(&mut self, panel: PanelId) -> bool {
        let flag = self.flag_mut(panel);
        let changed = !*flag;
        *flag = true;
        changed
    }

    pub fn close(&mut self, panel: PanelId) -> bool {
        let flag = self.flag_mut(panel);
        let changed = *flag;
        *flag = false;
        changed
    }

    pub fn toggle(&mut self, panel: PanelId) -> bool {
        let flag = self.flag_mut(panel);
        *flag = !*flag;
        true
    }

    pub fn open_panels(&self) -> impl Iterator<Item = PanelId> + '_ {
        PanelId::ALL.into_iter().filter(|panel| self.is_open(*panel))
    }
}

#[cfg(test)]
mod tests {
    use super::PanelId;
    use super::PanelState;
    use crate::config::PanelConfig;
    use pretty_assertions::assert_eq;

    #[test]
    fn guide_default_comes_from_config() {
        let open = PanelState::from_config(&PanelConfig::default());
        assert_eq!(open.open_panels().collect::<Vec<_>>(), vec![PanelId::Guide]);

        let closed = PanelState::from_config(&PanelConfig {
            guide_open_by_default: false,
        });
        assert_eq!(closed.open_panels().count(), 0);
    }

    #[test]
    fn close_is_idempotent() {
        for panel in PanelId::ALL {
            let mut state = PanelState::default();
            let before = state;
            assert!(!state.close(panel));
            assert_eq!(state, before);
        }
    }

    #[test]
    fn panels_are_independent() {
        let mut state = PanelState::default();
        for panel in PanelId::ALL {
            assert!(state.open(panel));
        }
        assert_eq!(state.open_panels().count(), PanelId::ALL.len());

        state.close(PanelId::Pricing);
        assert!(!state.is_open(PanelId::Pricing));
        assert!(state.is_open(PanelId::Assistant));
        assert!(state.is_open(PanelId::Admin));
    }

    #[test]
    fn toggle_flips_only_the_target() {
        let mut state = PanelState::default();
        state.toggle(PanelId::Assistant);
        assert!(state.is_open(PanelId::Assistant));
        assert!(!state.is_open(PanelId::Guide));
        state.toggle(PanelId::Assistant);
        assert!(!state.is_open(PanelId::Assistant));
    }

    #[test]
    fn open_reports_no_change_when_already_open() {
        let mut state = PanelState::default();
        assert!(state.open(PanelId::Settings));
        assert!(!state.open(PanelId::Settings));
    }
}
