use articulator::{
    AxisDecl, Body, DamperParams, EntityId, JointDecl, JointError, MechanismWorld, SpringParams,
};

fn make_pendulum(world: &mut MechanismWorld) -> EntityId {
    let base = world.add_body(Body::new("base"));
    let bob = world.add_body(Body::new("bob"));
    world
        .declare_joint(
            JointDecl::new("pivot", base, bob)
                .with_axis(AxisDecl::free().with_spring(50.0, 0.0).with_damper(0.8)),
        )
        .unwrap()
}

#[test]
fn test_apply_force_round_trip() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    world.apply_force_at(pivot, 0, 5.0, 10.0).unwrap();
    world.apply_force_at(pivot, 0, -3.0, 11.0).unwrap();

    let (value, timestamp) = world.joint(pivot).unwrap().applied(0).unwrap();
    println!("applied: {value} at t={timestamp}");
    assert_eq!(value, -3.0);
    assert_eq!(timestamp, 11.0);
}

#[test]
fn test_invalid_axis_is_surfaced() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    assert_eq!(
        world.apply_force(pivot, 1, 2.0).unwrap_err(),
        JointError::InvalidAxis { axis: 1, dofs: 1 }
    );
}

#[test]
fn test_too_many_axes_at_declaration() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let a = world.add_body(Body::new("a"));
    let b = world.add_body(Body::new("b"));

    let mut over = JointDecl::new("over", a, b);
    for _ in 0..7 {
        over = over.with_axis(AxisDecl::free());
    }
    assert_eq!(
        world.declare_joint(over).unwrap_err(),
        JointError::TooManyAxes(7)
    );

    let mut full = JointDecl::new("full", a, b);
    for _ in 0..6 {
        full = full.with_axis(AxisDecl::free());
    }
    assert!(world.declare_joint(full).is_ok());
}

#[test]
fn test_equivalent_force_combines_reactions() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    // The integrator collaborator reports the constraint reaction for the
    // single generalized coordinate.
    world.system().write().set_reactions(&[2.5]);
    world.apply_force_at(pivot, 0, 1.0, 0.5).unwrap();

    let reading = world.equivalent_force(pivot).unwrap();
    assert_eq!(reading, vec![3.5]);
}

#[test]
fn test_stale_forces_clear_under_max_age_policy() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();
    world.set_applied_force_max_age(Some(0.05));

    world.apply_force(pivot, 0, 4.0).unwrap();

    // One fixed step: well inside the max age, the force survives.
    world.step(1.0 / 60.0);
    assert_eq!(world.joint(pivot).unwrap().applied(0).unwrap().0, 4.0);

    // Step past the max age: the sweep zeroes the stale value.
    world.step(0.2);
    assert_eq!(world.joint(pivot).unwrap().applied(0).unwrap().0, 0.0);
}

#[test]
fn test_no_clearing_without_a_policy() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    world.apply_force(pivot, 0, 4.0).unwrap();
    world.step(5.0);

    assert_eq!(world.joint(pivot).unwrap().applied(0).unwrap().0, 4.0);
}

#[test]
fn test_declared_elements_are_attached_and_adjustable() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    {
        let joint = world.joint(pivot).unwrap();
        assert!(joint.elements().spring(0).is_some());
        assert!(joint.elements().damper(0).is_some());
        assert!(joint.elements().limit_stop(0).is_none());
    }

    // Runtime stiffness change through the stored handle.
    let joint = world.joint_mut(pivot).unwrap();
    assert!(joint.set_spring_stiffness(0, 75.0).unwrap());

    let joint = world.joint(pivot).unwrap();
    let handle = joint.elements().spring(0).unwrap();
    let system = world.system().read();
    match system.force_element(handle).unwrap() {
        articulator::ForceElement::Spring { params, .. } => {
            assert_eq!(params.stiffness, 75.0);
        }
        other => panic!("expected a spring, got {other:?}"),
    }
}

#[test]
fn test_attach_rejected_once_assembled() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    let joint = world.joint_mut(pivot).unwrap();
    let err = joint
        .attach_spring(
            0,
            SpringParams {
                stiffness: 10.0,
                reference: 0.0,
            },
        )
        .unwrap_err();
    assert_eq!(err, JointError::InvalidAxis { axis: 0, dofs: 1 });

    let err = joint.attach_damper(0, DamperParams { damping: 0.1 }).unwrap_err();
    assert_eq!(err, JointError::InvalidAxis { axis: 0, dofs: 1 });
}

#[test]
fn test_removing_a_joint_releases_its_elements() {
    let mut world = MechanismWorld::new(1.0 / 60.0);
    let pivot = make_pendulum(&mut world);
    world.assemble().unwrap();

    let spring = world.joint(pivot).unwrap().elements().spring(0).unwrap();
    world.remove_joint(pivot).unwrap();

    assert!(world.joint(pivot).is_none());
    assert!(world.system().read().force_element(spring).is_none());
    assert_eq!(
        world.apply_force(pivot, 0, 1.0).unwrap_err(),
        JointError::UnknownJoint(pivot)
    );
}
