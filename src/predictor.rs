//! The prediction pipeline, which turns a parsed BOQ into equipment, labour and fuel estimates.
use crate::aggregate::{Aggregate, LabourCounts};
use crate::boq::ParsedBoq;
use crate::equipment::EquipmentCatalog;
use crate::fuel::FuelReference;
use crate::fuel_plan::FuelPlan;
use crate::heuristics::apply_heuristics;
use crate::learned::ModelCache;
use crate::rules::RuleTable;
use crate::work_type::{
    EquipmentRequirement, LabourRole, SkillLevel, WorkType, WorkTypeCatalog,
    WorkTypeLabourProfile,
};
use log::{debug, warn};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

/// The estimated resources for a BOQ
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    /// Machinery needed, ordered by name
    pub machinery: BTreeSet<String>,
    /// Vehicles needed, ordered by name
    pub vehicles: BTreeSet<String>,
    /// Number of units of each machine
    pub machinery_counts: BTreeMap<String, u32>,
    /// Number of units of each vehicle
    pub vehicle_counts: BTreeMap<String, u32>,
    /// Headcount
    pub labour: LabourCounts,
    /// Labour roles needed, ordered by name
    pub labour_roles: BTreeSet<String>,
    /// Skill level of each labour role
    pub labour_role_types: BTreeMap<String, SkillLevel>,
    /// Roles from the work-type profile
    pub labour_role_details: Vec<LabourRole>,
    /// Vehicles from the work-type profile
    pub vehicle_details: Vec<EquipmentRequirement>,
    /// Machinery from the work-type profile
    pub machinery_details: Vec<EquipmentRequirement>,
    /// Fuel needed per shift
    pub fuel_plan: FuelPlan,
    /// The recognised work type, if any
    pub work_type: Option<WorkType>,
}

/// Estimates resources for BOQs.
///
/// All reference data is supplied up front and only read during prediction, so a single
/// predictor can serve many requests.
#[derive(Debug)]
pub struct Predictor {
    rules: RuleTable,
    models: ModelCache,
    work_types: WorkTypeCatalog,
    equipment: EquipmentCatalog,
    fuel: FuelReference,
}

impl Predictor {
    /// Create a predictor using the built-in catalogues
    pub fn new(rules: RuleTable, models: ModelCache) -> Self {
        Self {
            rules,
            models,
            work_types: WorkTypeCatalog::builtin().clone(),
            equipment: EquipmentCatalog::builtin().clone(),
            fuel: FuelReference::builtin().clone(),
        }
    }

    /// Replace the work-type catalogue
    pub fn with_work_types(mut self, work_types: WorkTypeCatalog) -> Self {
        self.work_types = work_types;
        self
    }

    /// Replace the equipment catalogue
    pub fn with_equipment(mut self, equipment: EquipmentCatalog) -> Self {
        self.equipment = equipment;
        self
    }

    /// Whether learned models are available, loading them if necessary
    pub fn has_learned_models(&self) -> bool {
        self.models.get().is_some()
    }

    /// The work-type catalogue in use
    pub fn work_types(&self) -> &WorkTypeCatalog {
        &self.work_types
    }

    /// Estimate the resources needed for a BOQ.
    ///
    /// This never fails: problems with individual material lines or learned models are logged and
    /// those signals are left out of the estimate.
    pub fn predict(&self, boq: &ParsedBoq) -> PredictionResult {
        let mut aggregate = Aggregate::default();
        let mut texts = Vec::with_capacity(boq.materials.len());

        for entry in &boq.materials {
            let material = entry.resolve();
            if let Some(name) = material.name.as_deref() {
                for (keyword, outcome) in self.rules.matches(name) {
                    debug!("Rule '{keyword}' matched material '{name}'");
                    aggregate.absorb(outcome.contribution());
                }
            }

            match apply_heuristics(&material) {
                Ok(contribution) => aggregate.absorb(contribution),
                Err(err) => warn!("Skipping heuristics for material line: {err:?}"),
            }
            texts.push(material.text);
        }

        for hint in boq.vehicle_hints.iter().filter(|hint| !hint.trim().is_empty()) {
            aggregate.vehicles.ensure_minimum(hint, 1);
        }
        for hint in boq.machinery_hints.iter().filter(|hint| !hint.trim().is_empty()) {
            aggregate.machinery.ensure_minimum(hint, 1);
        }

        self.apply_learned(&mut aggregate, &texts);

        let profile = self.work_type_profile(boq);
        if let Some(profile) = profile {
            apply_profile(&mut aggregate, profile);
        }

        self.finalise(aggregate, profile)
    }

    fn apply_learned(&self, aggregate: &mut Aggregate, texts: &[String]) {
        let Some(models) = self.models.get() else {
            return;
        };

        let prediction = match models.predict(texts) {
            Ok(prediction) => prediction,
            Err(err) => {
                warn!("Ignoring learned models for this BOQ: {err:?}");
                return;
            }
        };

        for name in prediction.machinery.into_iter().flatten() {
            aggregate.machinery.increment(&name, 1);
        }
        if let Some(labour) = prediction.labour {
            aggregate.labour.raise_to(labour);
        }
        aggregate.roles.extend(prediction.roles.into_iter().flatten());
    }

    fn work_type_profile(&self, boq: &ParsedBoq) -> Option<&WorkTypeLabourProfile> {
        let name = boq.work_type.as_deref()?;
        let profile = self.work_types.get_by_name(name);
        if profile.is_none() {
            debug!("Unknown work type '{name}'; no profile applied");
        }
        profile
    }

    fn finalise(
        &self,
        aggregate: Aggregate,
        profile: Option<&WorkTypeLabourProfile>,
    ) -> PredictionResult {
        let mut labour_role_types: BTreeMap<String, SkillLevel> = aggregate
            .roles
            .iter()
            .map(|role| (role.clone(), SkillLevel::default_for_role(role)))
            .collect();
        if let Some(profile) = profile {
            for role in &profile.roles {
                labour_role_types.insert(role.slug.clone(), role.skill_level);
            }
        }

        let fuel_plan = FuelPlan::build(
            &aggregate.machinery,
            &aggregate.vehicles,
            &self.equipment,
            &self.fuel,
        );

        PredictionResult {
            machinery: aggregate.machinery.names().map(String::from).collect(),
            vehicles: aggregate.vehicles.names().map(String::from).collect(),
            machinery_counts: aggregate.machinery.finalised(),
            vehicle_counts: aggregate.vehicles.finalised(),
            labour: aggregate.labour,
            labour_roles: aggregate.roles,
            labour_role_types,
            labour_role_details: profile.map(|p| p.roles.clone()).unwrap_or_default(),
            vehicle_details: profile.map(|p| p.vehicles.clone()).unwrap_or_default(),
            machinery_details: profile.map(|p| p.machinery.clone()).unwrap_or_default(),
            fuel_plan,
            work_type: profile.map(|p| p.work_type),
        }
    }
}

/// Add a work-type profile's roles and raise equipment to the profile's minimum counts
fn apply_profile(aggregate: &mut Aggregate, profile: &WorkTypeLabourProfile) {
    aggregate
        .roles
        .extend(profile.roles.iter().map(|role| role.slug.clone()));
    for requirement in &profile.vehicles {
        aggregate
            .vehicles
            .ensure_minimum(&requirement.name, requirement.minimum());
    }
    for requirement in &profile.machinery {
        aggregate
            .machinery
            .ensure_minimum(&requirement.name, requirement.minimum());
    }
}
