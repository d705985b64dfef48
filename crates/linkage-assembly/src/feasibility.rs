//! Geometric feasibility screening for crank configurations.

use crate::{AssemblyError, CrankConfig};

/// Screen a crank configuration for gross geometric infeasibility
/// before any parts are mounted.
///
/// Checks run in a fixed order, stopping at the first failure: each
/// coupler must sit on its link, each gear joint must sit on its gear,
/// the links must out-reach the widest joint separation the gears can
/// produce, and they must not overextend the narrowest one.
///
/// Passing here does not guarantee the construction solve succeeds; it
/// only rejects configurations that can never close.
pub fn validate_crank(config: &CrankConfig) -> Result<(), AssemblyError> {
    if config.link1_length < config.link1_coupler.x {
        return Err(AssemblyError::LinkShorterThanCoupler {
            link: 1,
            length: config.link1_length,
            offset: config.link1_coupler.x,
        });
    }
    if config.link2_length < config.link2_coupler.x {
        return Err(AssemblyError::LinkShorterThanCoupler {
            link: 2,
            length: config.link2_length,
            offset: config.link2_coupler.x,
        });
    }

    let joint1_sq = config.gear1_joint.coords.norm_squared();
    if joint1_sq > config.gear1_radius * config.gear1_radius {
        return Err(AssemblyError::JointOutsideGear {
            gear: 1,
            radius: config.gear1_radius,
            distance: joint1_sq.sqrt(),
        });
    }
    let joint2_sq = config.gear2_joint.coords.norm_squared();
    if joint2_sq > config.gear2_radius * config.gear2_radius {
        return Err(AssemblyError::JointOutsideGear {
            gear: 2,
            radius: config.gear2_radius,
            distance: joint2_sq.sqrt(),
        });
    }

    let anchor_gap = (config.gear2_anchor - config.gear1_anchor).norm();
    let widest = anchor_gap + config.gear1_radius + config.gear2_radius;
    let reach = config.link2_length + config.link1_coupler.x;
    if widest >= reach {
        return Err(AssemblyError::LinksTooShort {
            separation: widest,
            reach,
        });
    }

    let available = anchor_gap - config.gear1_radius + config.link1_coupler.x;
    if available < config.link2_length {
        return Err(AssemblyError::LinksTooLong {
            available,
            required: config.link2_length,
        });
    }

    Ok(())
}
