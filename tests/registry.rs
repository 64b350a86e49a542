//! Process-wide environment defaults. Kept in its own binary because sealing
//! is irreversible for the lifetime of the process.

use brook::env::defaults;
use brook::prelude::*;
use brook::{EnvError, Environment, ForegroundKey, PaintInstruction};

struct Spacing;

impl EnvKey for Spacing {
    type Value = f32;

    fn default_value() -> f32 {
        8.0
    }
}

#[test]
fn defaults_register_before_first_resolver_only() {
    assert!(!defaults::is_sealed());
    defaults::register::<ForegroundKey>(Color::BLUE).unwrap();
    defaults::register::<Spacing>(12.0).unwrap();
    assert_eq!(
        defaults::register::<Spacing>(4.0),
        Err(EnvError::AlreadyRegistered {
            key: std::any::type_name::<Spacing>()
        })
    );

    let mut resolver = Resolver::default();
    assert!(defaults::is_sealed());
    assert_eq!(Environment::new().lookup::<Spacing>(), 12.0);

    let plan = resolver
        .resolve(&rectangle(), Size::new(10.0, 10.0))
        .unwrap();
    assert_eq!(plan.entries()[0].paint, PaintInstruction::Fill(Color::BLUE));

    assert!(matches!(
        defaults::register::<Spacing>(16.0),
        Err(EnvError::RegistrySealed { .. })
    ));
    assert_eq!(Environment::new().lookup::<Spacing>(), 12.0);
}
