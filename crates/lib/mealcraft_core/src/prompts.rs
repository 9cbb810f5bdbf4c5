//! Task-specific system instructions.

/// The kind of question a query endpoint answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    /// Meal planning, nutrition and recipes.
    Nutrition,
    /// Drinks to serve with a given dish.
    BeveragePairing,
    /// Dishes to serve with a given drink.
    DishPairing,
}

const NUTRITIONIST: &str = "You are an expert nutritionist and chef, an assistant that helps \
users with meal planning, nutrition, and recipe ideas. Return your output in MARKUP language \
only. You will always provide a list of ingredients and then the steps to make it.";

const SOMMELIER: &str = "You are an experienced sommelier and beverage specialist. Given a \
dish or meal, recommend wines, beers, spirits or non-alcoholic drinks that pair well with it \
and briefly explain why each pairing works. Return your output in MARKUP language only.";

const PAIRING_SPECIALIST: &str = "You are a food pairing specialist. Given a beverage, \
suggest dishes that complement it, describing the flavours that make each pairing work. \
Return your output in MARKUP language only.";

impl Task {
    /// System instruction sent ahead of the user's query.
    pub fn system_instruction(self) -> &'static str {
        match self {
            Task::Nutrition => NUTRITIONIST,
            Task::BeveragePairing => SOMMELIER,
            Task::DishPairing => PAIRING_SPECIALIST,
        }
    }

    /// Short name used in logs.
    pub fn name(self) -> &'static str {
        match self {
            Task::Nutrition => "respond",
            Task::BeveragePairing => "beverage-pairings",
            Task::DishPairing => "dish-pairings",
        }
    }
}
