use rhedrives::DiscDriveScope;

/// A named multi-step operation over a drive scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AtomicAction {
    /// Hand the disc in the scoped drive off to a player.
    PlayCd(DiscDriveScope),
}

impl AtomicAction {
    pub fn play_cd(scope: DiscDriveScope) -> Self {
        AtomicAction::PlayCd(scope)
    }

    pub fn scope(&self) -> &DiscDriveScope {
        match self {
            AtomicAction::PlayCd(scope) => scope,
        }
    }
}

impl std::fmt::Display for AtomicAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AtomicAction::PlayCd(scope) => write!(f, "play CD ({})", scope),
        }
    }
}
