use super::config::AccessibilityConfig;
use super::geometry;
use super::types::TouchTarget;

/// Accessibility problem found when a target is registered.
#[derive(Clone, Debug, PartialEq)]
pub enum TargetIssue {
    Undersized {
        width: f64,
        height: f64,
        min: f64,
    },
    TooClose {
        other: String,
        distance: f64,
        min: f64,
    },
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccessibilityStatus {
    pub screen_reader_enabled: bool,
    pub announce_gestures: bool,
    pub total_targets: usize,
    pub undersized_targets: Vec<String>,
    pub crowded_pairs: Vec<(String, String)>,
    pub unlabeled_targets: Vec<String>,
}

impl AccessibilityStatus {
    pub fn is_compliant(&self) -> bool {
        self.undersized_targets.is_empty() && self.crowded_pairs.is_empty()
    }
}

/// Registered targets in registration order; later entries sit on top.
#[derive(Debug, Default)]
pub struct TargetRegistry {
    targets: Vec<TouchTarget>,
    config: AccessibilityConfig,
}

impl TargetRegistry {
    pub fn new(config: AccessibilityConfig) -> Self {
        Self {
            targets: Vec::new(),
            config,
        }
    }

    pub fn set_config(&mut self, config: AccessibilityConfig) {
        self.config = config;
    }

    fn min_size(&self, target: &TouchTarget) -> f64 {
        self.config.min_touch_target_size.max(target.min_size)
    }

    fn issues_for(&self, target: &TouchTarget) -> Vec<TargetIssue> {
        let mut issues = Vec::new();
        let min = self.min_size(target);
        if target.width < min || target.height < min {
            issues.push(TargetIssue::Undersized {
                width: target.width,
                height: target.height,
                min,
            });
        }
        let bounds = target.bounds();
        let spacing = self.config.spacing_between_targets;
        for other in self.targets.iter().filter(|other| other.id != target.id) {
            let distance = geometry::center_distance(&bounds, &other.bounds());
            if distance < spacing {
                issues.push(TargetIssue::TooClose {
                    other: other.id.clone(),
                    distance,
                    min: spacing,
                });
            }
        }
        issues
    }

    /// Always registers; re-registering an id replaces it and moves it on top.
    /// Returns the accessibility issues that were logged.
    pub fn register(&mut self, target: TouchTarget) -> Vec<TargetIssue> {
        let issues = self.issues_for(&target);
        for issue in &issues {
            match issue {
                TargetIssue::Undersized { width, height, min } => log::warn!(
                    "touch: target_undersized id={} width={} height={} min={}",
                    target.id,
                    width,
                    height,
                    min
                ),
                TargetIssue::TooClose {
                    other,
                    distance,
                    min,
                } => log::warn!(
                    "touch: target_spacing id={} other={} distance={:.1} min={}",
                    target.id,
                    other,
                    distance,
                    min
                ),
            }
        }
        self.targets.retain(|existing| existing.id != target.id);
        log::debug!("touch: target_registered id={}", target.id);
        self.targets.push(target);
        issues
    }

    pub fn unregister(&mut self, id: &str) -> Option<TouchTarget> {
        let index = self.targets.iter().position(|target| target.id == id)?;
        Some(self.targets.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&TouchTarget> {
        self.targets.iter().find(|target| target.id == id)
    }

    /// Topmost target containing the point.
    pub fn target_at(&self, x: f64, y: f64) -> Option<&TouchTarget> {
        self.targets
            .iter()
            .rev()
            .find(|target| target.bounds().contains(x, y))
    }

    pub fn iter(&self) -> impl Iterator<Item = &TouchTarget> {
        self.targets.iter()
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    pub fn status(&self) -> AccessibilityStatus {
        let mut status = AccessibilityStatus {
            screen_reader_enabled: self.config.screen_reader_enabled,
            announce_gestures: self.config.announce_gestures,
            total_targets: self.targets.len(),
            ..AccessibilityStatus::default()
        };
        let spacing = self.config.spacing_between_targets;
        for (index, target) in self.targets.iter().enumerate() {
            let min = self.min_size(target);
            if target.width < min || target.height < min {
                status.undersized_targets.push(target.id.clone());
            }
            if target.accessibility_label.is_none() {
                status.unlabeled_targets.push(target.id.clone());
            }
            let bounds = target.bounds();
            for other in &self.targets[index + 1..] {
                if geometry::center_distance(&bounds, &other.bounds()) < spacing {
                    status
                        .crowded_pairs
                        .push((target.id.clone(), other.id.clone()));
                }
            }
        }
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn undersized_target_is_still_registered() {
        let mut registry = TargetRegistry::default();
        let issues = registry.register(TouchTarget::new("ok", 0.0, 0.0, 20.0, 20.0));
        assert_eq!(
            issues,
            vec![TargetIssue::Undersized {
                width: 20.0,
                height: 20.0,
                min: 44.0
            }]
        );
        assert!(registry.get("ok").is_some());
        assert_eq!(registry.status().undersized_targets, vec!["ok".to_owned()]);
    }

    #[test]
    fn per_target_minimum_can_raise_the_bar() {
        let mut registry = TargetRegistry::default();
        let issues =
            registry.register(TouchTarget::new("big", 0.0, 0.0, 50.0, 50.0).with_min_size(60.0));
        assert_eq!(issues.len(), 1);
    }

    #[test]
    fn crowded_centers_are_reported() {
        let mut registry = TargetRegistry::default();
        assert!(registry
            .register(TouchTarget::new("a", 0.0, 0.0, 48.0, 48.0))
            .is_empty());
        let issues = registry.register(TouchTarget::new("b", 4.0, 0.0, 48.0, 48.0));
        assert!(matches!(
            issues.as_slice(),
            [TargetIssue::TooClose { other, .. }] if other == "a"
        ));
        assert_eq!(
            registry.status().crowded_pairs,
            vec![("a".to_owned(), "b".to_owned())]
        );
        assert!(!registry.status().is_compliant());
    }

    #[test]
    fn reregistering_overwrites_and_moves_on_top() {
        let mut registry = TargetRegistry::default();
        registry.register(TouchTarget::new("a", 0.0, 0.0, 100.0, 100.0));
        registry.register(TouchTarget::new("b", 50.0, 50.0, 100.0, 100.0));
        assert_eq!(registry.target_at(75.0, 75.0).map(|t| t.id.as_str()), Some("b"));

        registry.register(TouchTarget::new("a", 0.0, 0.0, 100.0, 100.0).with_label("Back"));
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.target_at(75.0, 75.0).map(|t| t.id.as_str()), Some("a"));
        assert_eq!(registry.status().unlabeled_targets, vec!["b".to_owned()]);
    }

    #[test]
    fn unregister_is_idempotent() {
        let mut registry = TargetRegistry::default();
        registry.register(TouchTarget::new("a", 0.0, 0.0, 48.0, 48.0));
        assert!(registry.unregister("a").is_some());
        assert!(registry.unregister("a").is_none());
        assert!(registry.target_at(10.0, 10.0).is_none());
    }
}
