pub(crate) use self::ai_model::AiModel;

mod ai_model;
