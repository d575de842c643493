//! OTP Repository

use mongodb::{Collection, Database, bson::doc};

use crate::auth::otp::{Otp, OtpUserType};
use crate::shared::error::Result;

pub struct OtpRepository {
    collection: Collection<Otp>,
}

impl OtpRepository {
    pub fn new(db: &Database) -> Self {
        Self {
            collection: db.collection("otps"),
        }
    }

    pub async fn insert(&self, otp: &Otp) -> Result<()> {
        self.collection.insert_one(otp).await?;
        Ok(())
    }

    pub async fn find_by_phone(
        &self,
        phone: &str,
        user_type: OtpUserType,
    ) -> Result<Option<Otp>> {
        Ok(self
            .collection
            .find_one(doc! {
                "phone": phone,
                "user_type": user_type.as_str(),
                "deleted_at": null,
            })
            .await?)
    }

    pub async fn find_by_email(
        &self,
        email: &str,
        user_type: OtpUserType,
    ) -> Result<Option<Otp>> {
        Ok(self
            .collection
            .find_one(doc! {
                "email": email,
                "user_type": user_type.as_str(),
                "deleted_at": null,
            })
            .await?)
    }

    pub async fn update(&self, otp: &Otp) -> Result<()> {
        self.collection
            .replace_one(doc! { "_id": &otp.id }, otp)
            .await?;
        Ok(())
    }
}
